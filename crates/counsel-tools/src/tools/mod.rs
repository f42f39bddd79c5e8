pub mod analyze_contract;
pub(crate) mod http;
pub mod martindale;
pub mod web_search;

pub use analyze_contract::AnalyzeContractTool;
pub use martindale::MartindaleUrlTool;
pub use web_search::WebSearchTool;
