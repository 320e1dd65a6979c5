mod catalog_search;
pub(crate) use catalog_search::*;

mod id3_tagger;
pub(crate) use id3_tagger::*;

mod metadata_provider;
pub(crate) use metadata_provider::*;

mod source_resolver;
pub(crate) use source_resolver::*;

mod ytdlp_fetcher;
pub(crate) use ytdlp_fetcher::*;
