//! Connection request URL extraction.
//!
//! # Responsibilities
//! - Find the marker tag inside a raw CWMP body
//! - Extract the literal URL value that follows it
//!
//! # Design Decisions
//! - Plain substring scan, the body is never parsed as XML
//! - Only the first marker occurrence is honored
//! - Every index is bounds-checked: a truncated body is a miss, never a panic

/// Scheme prefix that opens the URL value.
const URL_START: &[u8] = b"http";

/// Delimiter that closes the URL value (the `</Value>` tag).
const URL_END: u8 = b'<';

/// Locate the connection request URL announced after `marker` in `body`.
///
/// Returns `None` when the marker is absent, when no `http` follows it, when
/// the value is never closed by `<`, or when the value is not valid UTF-8.
pub fn locate<'a>(body: &'a [u8], marker: &str) -> Option<&'a str> {
    let marker_at = find(body, marker.as_bytes())?;
    let rest = &body[marker_at..];

    let start = find(rest, URL_START)?;
    let value = &rest[start..];

    let end = value.iter().position(|&b| b == URL_END)?;
    std::str::from_utf8(&value[..end]).ok()
}

/// Byte offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cwmp::CONNECTION_REQUEST_MARKER;

    #[test]
    fn test_locate_igd_parameter() {
        let body = br#"
            <ParameterValueStruct>
                <Name>InternetGatewayDevice.ManagementServer.ConnectionRequestURL</Name>
                <Value xsi:type="xsd:string">http://8.8.8.8:7547</Value>
            </ParameterValueStruct>
        "#;
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), Some("http://8.8.8.8:7547"));
    }

    #[test]
    fn test_locate_device_parameter() {
        let body = br#"
            <ParameterValueStruct>
                <Name>Device.ManagementServer.ConnectionRequestURL</Name>
                <Value xsi:type="xsd:string">http://7.7.7.7:7547</Value>
            </ParameterValueStruct>
        "#;
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), Some("http://7.7.7.7:7547"));
    }

    #[test]
    fn test_missing_marker() {
        let body = b"<EventStruct><EventCode>0 BOOTSTRAP</EventCode><CommandKey/></EventStruct>";
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), None);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let body = b"<Name>Device.ManagementServer.connectionrequesturl</Name><Value>http://1.2.3.4/</Value>";
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), None);
    }

    #[test]
    fn test_first_marker_wins() {
        let body = b"<Name>ConnectionRequestURL</Name><Value>http://first:7547</Value>\
                     <Name>ConnectionRequestURL</Name><Value>http://second:7547</Value>";
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), Some("http://first:7547"));
    }

    #[test]
    fn test_url_before_marker_is_ignored() {
        let body = b"<URL>http://acs.example.net/</URL><Name>ConnectionRequestURL</Name><Value>http://cpe:7547</Value>";
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), Some("http://cpe:7547"));
    }

    #[test]
    fn test_marker_without_url_is_a_miss() {
        let body = b"<Name>Device.ManagementServer.ConnectionRequestURL</Name><Value></Value>";
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), None);
    }

    #[test]
    fn test_unterminated_value_is_a_miss() {
        let body = b"<Name>ConnectionRequestURL</Name><Value>http://10.0.0.1:7547";
        assert_eq!(locate(body, CONNECTION_REQUEST_MARKER), None);
    }

    #[test]
    fn test_marker_at_end_of_body() {
        assert_eq!(locate(b"ConnectionRequestURL", CONNECTION_REQUEST_MARKER), None);
        assert_eq!(locate(b"", CONNECTION_REQUEST_MARKER), None);
    }

    #[test]
    fn test_https_value() {
        let body = b"<Name>ConnectionRequestURL</Name><Value>https://cpe.example.net:7548/cr</Value>";
        assert_eq!(
            locate(body, CONNECTION_REQUEST_MARKER),
            Some("https://cpe.example.net:7548/cr")
        );
    }

    #[test]
    fn test_find() {
        assert_eq!(find(b"abcabc", b"ca"), Some(2));
        assert_eq!(find(b"abc", b"abcd"), None);
        assert_eq!(find(b"abc", b""), None);
    }
}
