//! Info 프로토콜 응답 파서
//!
//! 노드가 돌려준 `k=v;k=v` 형태의 한 줄 응답을 키-값 맵으로 변환합니다.
//! 파서는 실패하지 않습니다. 잘못된 세그먼트는 건너뜁니다.

use std::collections::HashMap;

use crate::error::CollectorError;

/// Collector 작업 결과 타입
pub type CollectResult<T> = Result<T, CollectorError>;

/// Prefix of a reply line carrying a node-reported failure
pub const ERROR_PREFIX: &str = "ERROR:";

/// 한 노드(또는 네임스페이스)의 통계 맵
pub type MetricsMap = HashMap<String, String>;

/// 노드 이름 -> 통계 맵
pub type ClusterInfo = HashMap<String, MetricsMap>;

/// 노드 이름 -> (네임스페이스 이름 -> 통계 맵)
pub type NamespaceInfo = HashMap<String, HashMap<String, MetricsMap>>;

/// 요청한 커맨드 -> 응답 원문
pub type RawReply = HashMap<String, String>;

/// Split a reply line into `(key, value)` segments.
///
/// Keys are trimmed. Segments without `=` yield an empty value. Segments
/// with an empty key are dropped.
fn segments(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.trim()
        .split(';')
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.trim(), value),
            None => (segment.trim(), ""),
        })
        .filter(|(key, _)| !key.is_empty())
}

/// 한 줄 응답을 평탄한 맵으로 파싱
///
/// ```
/// use asinfo_exporter::collector::parse_flat;
///
/// let map = parse_flat("client_connections=1;cluster_size=3");
/// assert_eq!(map.get("cluster_size").map(String::as_str), Some("3"));
/// ```
///
/// Duplicate keys resolve last-write-wins.
pub fn parse_flat(line: &str) -> MetricsMap {
    segments(line)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// `ERROR:` 로 시작하는 응답인지 확인
pub fn is_error_reply(line: &str) -> bool {
    line.trim_start().starts_with(ERROR_PREFIX)
}

/// Returns the first request-level error carried by a reply.
///
/// When a node rejects a whole request (e.g. `ERROR:NOT_AUTHENTICATED`) the
/// reply holds the error line as a key instead of one entry per command.
pub fn reply_error(reply: &RawReply) -> Option<&str> {
    reply
        .keys()
        .map(String::as_str)
        .find(|key| is_error_reply(key))
}

/// `namespaces` 응답에서 네임스페이스 이름 목록 추출
///
/// Order of first appearance is kept and duplicates are removed, so the
/// follow-up request lists each namespace once.
pub fn namespace_names(listing: &str) -> Vec<String> {
    if is_error_reply(listing) {
        return Vec::new();
    }

    let mut names: Vec<String> = Vec::new();
    for (name, _) in segments(listing) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Info command that returns statistics for one namespace
pub fn namespace_command(name: &str) -> String {
    format!("namespace/{}", name)
}

/// 네임스페이스별 응답을 2단계 맵으로 파싱
///
/// Every name in `names` appears in the result exactly once. A namespace
/// whose reply line is missing or starts with `ERROR:` maps to an empty
/// metrics map. A request-level error yields an empty result.
pub fn parse_namespaces(names: &[String], reply: &RawReply) -> HashMap<String, MetricsMap> {
    if let Some(err) = reply_error(reply) {
        tracing::debug!(error = %err, "Namespace request rejected by node");
        return HashMap::new();
    }

    names
        .iter()
        .map(|name| {
            let metrics = match reply.get(&namespace_command(name)) {
                Some(line) if is_error_reply(line) => {
                    tracing::debug!(namespace = %name, error = %line.trim(), "Namespace returned error");
                    MetricsMap::new()
                }
                Some(line) => parse_flat(line),
                None => MetricsMap::new(),
            };
            (name.clone(), metrics)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(pairs: &[(&str, &str)]) -> RawReply {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_flat_pairs() {
        let map = parse_flat("a=1;b=2");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&"1".to_string()));
        assert_eq!(map.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_flat_empty() {
        assert!(parse_flat("").is_empty());
        assert!(parse_flat(";;").is_empty());
    }

    #[test]
    fn test_parse_flat_trailing_separator() {
        let map = parse_flat("a=1;b=2;\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_flat_bare_token() {
        let map = parse_flat("flag");
        assert_eq!(map, MetricsMap::from([("flag".to_string(), String::new())]));
    }

    #[test]
    fn test_parse_flat_last_write_wins() {
        let map = parse_flat("a=1;a=2");
        assert_eq!(map, MetricsMap::from([("a".to_string(), "2".to_string())]));
    }

    #[test]
    fn test_parse_flat_skips_empty_key() {
        let map = parse_flat("=orphan;a=1");
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("a"));
    }

    #[test]
    fn test_parse_flat_splits_on_first_equals() {
        let map = parse_flat("query=a=b;x=");
        assert_eq!(map.get("query"), Some(&"a=b".to_string()));
        assert_eq!(map.get("x"), Some(&String::new()));
    }

    #[test]
    fn test_namespace_names() {
        assert_eq!(namespace_names("test;bar"), vec!["test", "bar"]);
        assert_eq!(namespace_names("test;bar;test;"), vec!["test", "bar"]);
        assert!(namespace_names("").is_empty());
        assert!(namespace_names("ERROR:NOT_AUTHENTICATED").is_empty());
    }

    #[test]
    fn test_namespace_names_trims_whitespace() {
        let names = namespace_names("test; bar ;\tcache");
        assert_eq!(names, vec!["test", "bar", "cache"]);
        assert_eq!(namespace_command(&names[1]), "namespace/bar");
    }

    #[test]
    fn test_parse_flat_trims_keys() {
        let map = parse_flat("a=1; b=2");
        assert_eq!(map.get("b"), Some(&"2".to_string()));
        assert!(!map.contains_key(" b"));
    }

    #[test]
    fn test_parse_namespaces() {
        let names = namespace_names("test;bar");
        let raw = reply(&[
            (
                "namespace/test",
                "memory_used_bytes=27721728;memory_used_data_bytes=0;memory_used_index_bytes=0",
            ),
            ("namespace/bar", "memory_used_sindex_bytes=27721728"),
        ]);

        let parsed = parse_namespaces(&names, &raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed["test"].get("memory_used_bytes"),
            Some(&"27721728".to_string())
        );
        assert_eq!(parsed["test"].len(), 3);
        assert_eq!(
            parsed["bar"].get("memory_used_sindex_bytes"),
            Some(&"27721728".to_string())
        );
    }

    #[test]
    fn test_parse_namespaces_error_line_is_empty() {
        let names = namespace_names("test;bar");
        let raw = reply(&[
            ("namespace/test", "memory_used_bytes=100"),
            ("namespace/bar", "ERROR:ROLE_VIOLATION"),
        ]);

        let parsed = parse_namespaces(&names, &raw);
        assert_eq!(parsed.len(), 2);
        assert!(parsed["bar"].is_empty());
        assert_eq!(parsed["test"].get("memory_used_bytes"), Some(&"100".to_string()));
    }

    #[test]
    fn test_parse_namespaces_only_listed_names() {
        let names = namespace_names("test");
        let raw = reply(&[
            ("namespace/test", "objects=1"),
            ("namespace/stale", "objects=9"),
        ]);

        let parsed = parse_namespaces(&names, &raw);
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains_key("test"));
    }

    #[test]
    fn test_parse_namespaces_missing_line_is_empty() {
        let names = namespace_names("test;bar");
        let raw = reply(&[("namespace/test", "objects=1")]);

        let parsed = parse_namespaces(&names, &raw);
        assert_eq!(parsed.len(), 2);
        assert!(parsed["bar"].is_empty());
    }

    #[test]
    fn test_parse_namespaces_request_rejected() {
        let names = namespace_names("test;bar");
        let raw = reply(&[("ERROR:NOT_AUTHENTICATED", "")]);

        assert!(parse_namespaces(&names, &raw).is_empty());
    }

    #[test]
    fn test_is_error_reply() {
        assert!(is_error_reply("ERROR:NOT_AUTHENTICATED"));
        assert!(is_error_reply("ERROR::bad namespace"));
        assert!(!is_error_reply("objects=1"));
        assert!(!is_error_reply("error_count=0"));
    }
}
