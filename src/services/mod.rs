pub mod answer_service;
pub mod catalog_service;
pub mod eligibility;
pub mod selection;
pub mod session_service;
pub mod summary_service;
pub mod view_service;
