pub mod ai_llm;
pub mod auth_http;
pub mod notify;
pub mod ocr_llm;
pub mod storage;

pub use ai_llm::OpenAiStudyAdapter;
pub use auth_http::HttpAuthAdapter;
pub use notify::{TracingNavigator, TracingNotifier};
pub use ocr_llm::OpenAiOcrAdapter;
pub use storage::FileSessionStorage;
