mod temp_store;

pub use temp_store::{StoreError, TempStore};
