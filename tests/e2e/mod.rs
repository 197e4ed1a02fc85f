// End-to-end tests for the PDF audiobook HTTP API
//
// Each test gets its own server bound to an ephemeral port and its own
// temporary data directory, so tests run in parallel without sharing files.
//
// Architecture:
// - The real router, services and storage, built exactly as in `main`
// - Fake speech, cloning and transcoding engines that write real WAV files,
//   so no external binaries are needed
// - PDFs generated on the fly with lopdf

mod helpers;
mod test_preview;
