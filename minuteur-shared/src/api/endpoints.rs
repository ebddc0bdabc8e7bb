use super::API_V1_PREFIX;

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

pub fn timer(base: &str) -> String {
    base_join(base, &format!("{}/timer", API_V1_PREFIX))
}

pub fn events(base: &str) -> String {
    base_join(base, &format!("{}/events", API_V1_PREFIX))
}

pub fn version(base: &str) -> String {
    base_join(base, &format!("{}/version", API_V1_PREFIX))
}

pub fn healthz(base: &str) -> String {
    base_join(base, "healthz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_double_slashes() {
        assert_eq!(
            timer("http://127.0.0.1:5161/"),
            "http://127.0.0.1:5161/api/v1/timer"
        );
        assert_eq!(
            events("http://127.0.0.1:5161"),
            "http://127.0.0.1:5161/api/v1/events"
        );
        assert_eq!(healthz("http://h/"), "http://h/healthz");
    }
}
