//! # Petclinic
//!
//! A veterinary clinic web application on the `may` coroutine runtime:
//! owners with their pets and visits, plus a read-only list of vets.
//!
//! Requests are served by `may_minihttp` ([`web::server`]), routed by
//! [`web::Clinic`] and persisted either in PostgreSQL through a small
//! coroutine-safe pool ([`pool::PgPool`]) or in the seeded
//! [`repository::MemoryStore`].

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod formatting;
pub mod metrics;
pub mod migration;
pub mod model;
pub mod page;
pub mod pool;
pub mod repository;
pub mod sql;
pub mod transaction;
pub mod validation;
pub mod web;

pub use error::ClinicError;
pub use web::Clinic;

use cache::CachedVetRepository;
use config::{AppConfig, Backend};
use pool::PgPool;
use repository::{MemoryStore, OwnerRepository, PgOwnerRepository, PgVetRepository, VetRepository};
use std::sync::Arc;
use std::time::Duration;

/// Wire repositories for the configured backend into a [`Clinic`].
///
/// With the PostgreSQL backend the pool is opened eagerly and, when
/// `database.run_migrations` is set, pending migrations are applied first.
pub fn build_clinic(config: &AppConfig) -> Result<Clinic, ClinicError> {
    let (owners, vets): (Arc<dyn OwnerRepository>, Arc<dyn VetRepository>) = match config.database.backend {
        Backend::Memory => {
            log::info!("using the in-memory store");
            let store = Arc::new(MemoryStore::seeded());
            let owners: Arc<dyn OwnerRepository> = store.clone();
            let vets: Arc<dyn VetRepository> = store;
            (owners, vets)
        }
        Backend::Postgres => {
            let pool = PgPool::from_config(&config.database)?;
            if config.database.run_migrations {
                migration::startup_migrations(&pool, &config.database.migrations_dir)?;
            }
            let owners: Arc<dyn OwnerRepository> = Arc::new(PgOwnerRepository::new(pool.clone()));
            let vets: Arc<dyn VetRepository> = Arc::new(PgVetRepository::new(pool));
            (owners, vets)
        }
    };

    let vets: Arc<dyn VetRepository> = if config.cache.vets_enabled {
        let ttl = config.cache.vets_ttl_seconds.map(Duration::from_secs);
        Arc::new(CachedVetRepository::new(
            vets,
            ttl,
            config.cache.vets_max_entries,
        ))
    } else {
        vets
    };

    Ok(Clinic::new(owners, vets, config.paging.page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_builds_seeded_clinic() {
        let mut config = AppConfig::default();
        config.database.backend = Backend::Memory;

        let clinic = build_clinic(&config).expect("clinic");
        assert_eq!(clinic.page_size(), 5);
        assert_eq!(clinic.vets().find_all().expect("vets").len(), 6);
        assert!(clinic.owners().find_by_id(1).expect("lookup").is_some());
    }
}
