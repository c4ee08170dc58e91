pub(crate) mod kv;
pub(crate) mod outbox;
pub(crate) mod samples;
pub(crate) mod sessions;
