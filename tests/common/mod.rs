use silo::config::StoreConfig;
use silo::session::SessionStore;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store(max_messages_per_chunk: usize) -> (SessionStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let config = StoreConfig {
        max_messages_per_chunk,
        session_update_attempts: 2,
    };
    let store = SessionStore::new_with_path(tmp.path().join("sessions.db"), config)
        .expect("failed to create session store");
    (store, tmp)
}
