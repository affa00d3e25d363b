use super::schema::*;
use crate::foundation::CosignError;
use rocksdb::{ColumnFamilyDescriptor, Options as RocksOptions, DB};
use std::path::Path;

pub fn open_db_with_cfs(path: impl AsRef<Path>) -> Result<DB, CosignError> {
    let mut options = RocksOptions::default();
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    options.set_use_fsync(true);
    options.set_manual_wal_flush(false);
    options.set_paranoid_checks(true);

    let mut point_lookup = RocksOptions::default();
    point_lookup.optimize_for_point_lookup(64);

    let cfs = vec![
        ColumnFamilyDescriptor::new(CF_DEFAULT, RocksOptions::default()),
        ColumnFamilyDescriptor::new(CF_METADATA, RocksOptions::default()),
        ColumnFamilyDescriptor::new(CF_ACCOUNT, point_lookup.clone()),
        ColumnFamilyDescriptor::new(CF_TRANSACTION, point_lookup),
    ];

    DB::open_cf_descriptors(&options, path, cfs)
        .map_err(|err| CosignError::StorageError { operation: "rocksdb open_cf_descriptors".to_string(), details: err.to_string() })
}
