// Library root
// -----------
// The binary (`main.rs`) only parses arguments and dispatches; everything it
// runs lives here so the flows can be exercised against a mock backend.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the backend (auth, listing, upload,
//   arbitrary GETs) and the request/response shapes it exchanges.
// - `config`: defaults plus environment overrides.
// - `claims`: read-only decoding of the login token's payload.
// - `video`: video records, listing shapes and upload checks.
// - `flows`: the four probes, each returning a report.
// - `ui`: report printing, spinners and the interactive menu.
pub mod api;
pub mod claims;
pub mod config;
pub mod flows;
pub mod ui;
pub mod video;
