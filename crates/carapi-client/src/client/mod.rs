//! Resource clients, one per API family
//!
//! Each client owns a [`Session`](crate::Session) and exposes one method per
//! endpoint. Credential handling comes from the [`ApiClient`](crate::ApiClient)
//! trait.

mod oem;
mod powersports;
mod vehicles;

pub use oem::CarApiOem;
pub use powersports::Powersports;
pub use vehicles::CarApi;

/// Percent-encode a value for use as a single path segment.
///
/// VINs, OBD codes and attribute names are caller input; anything outside
/// the unreserved set is escaped so it cannot split or end the path.
fn encode_path_segment(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
