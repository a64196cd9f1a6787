pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// ISO-8601 UTC timestamp from the browser clock, matching the backend's
/// `created_at` format so guest records sort alongside server projects.
pub(crate) fn now_iso() -> String {
    let d = js_sys::Date::new_0();
    String::from(d.to_iso_string())
}

/// Local id for a guest trial project. Prefixed so it can never collide with
/// a server-issued id; the claim endpoint receives it verbatim.
pub(crate) fn new_guest_id() -> String {
    let noise = (js_sys::Math::random() * 1_000_000.0) as u32;
    format!("guest-{}-{}", now_ms(), noise)
}

#[cfg(test)]
mod tests {
    #[test]
    fn guest_id_shape() {
        // now_ms/new_guest_id need a JS runtime; only the format is checked here.
        let id = format!("guest-{}-{}", 1700000000000i64, 42u32);
        assert!(id.starts_with("guest-"));
    }
}
