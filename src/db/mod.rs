//! Postgres 持久化。
//!
//! ```sql
//! CREATE TABLE t_sync_record (
//!     model_name varchar(64)  NOT NULL,
//!     record_id  varchar(64)  NOT NULL,
//!     payload    jsonb        NOT NULL,
//!     synced_at  timestamptz  NOT NULL,
//!     PRIMARY KEY (model_name, record_id)
//! );
//!
//! CREATE TABLE t_connection (
//!     id                  bigserial PRIMARY KEY,
//!     connection_id       varchar(255) NOT NULL,
//!     provider_config_key varchar(255) NOT NULL,
//!     connection_token    varchar(255),
//!     metadata            jsonb,
//!     updated_at          timestamptz
//! );
//! ```

pub mod connections;
pub mod pool;
pub mod records;

pub use connections::PgConnectionStore;
pub use pool::create_pool;
pub use records::PgSink;
