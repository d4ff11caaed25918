pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod postgres_lead_repo;
pub use postgres_lead_repo::PgLeadRepository;
pub mod sqlite_lead_repo;
pub use sqlite_lead_repo::SqliteLeadRepository;
pub mod supabase_lead_repo;
pub use supabase_lead_repo::SupabaseLeadRepository;
