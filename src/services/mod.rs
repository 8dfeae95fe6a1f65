pub(crate) mod indexer;
pub(crate) mod oracle;
pub(crate) mod storage;
