// End-to-end tests for the Audify Backend API
//
// Each test boots the real router on an ephemeral port. External backends
// (speech synthesis, metadata, cover art, search) are replaced by in-process
// fakes and blobs are written to a per-test temporary directory, so tests run
// in parallel without shared state.

mod helpers;
mod test_documents;
mod test_search;
