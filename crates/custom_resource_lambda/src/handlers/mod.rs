pub mod copy_assets;
pub mod copy_template;
pub mod dispatch;
pub mod error;
pub mod fetch_archive;
pub mod gen_uuid;
pub mod update_bucket_policy;
