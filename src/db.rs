pub mod agent_repo;
pub use agent_repo::AgentRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod application_repo;
pub use application_repo::ApplicationRepository;
pub mod history_repo;
pub use history_repo::HistoryRepository;
pub mod reference_repo;
pub use reference_repo::ReferenceRepository;
