mod service;

pub use service::QueryService;
