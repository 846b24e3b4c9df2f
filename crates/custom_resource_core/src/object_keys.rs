/// Join a destination prefix and an archive entry name into an object key.
pub fn join_object_key(prefix: &str, name: &str) -> String {
    let trimmed_prefix = prefix.trim_matches('/');
    let trimmed_name = name.trim_start_matches('/');
    if trimmed_prefix.is_empty() {
        trimmed_name.to_string()
    } else {
        format!("{trimmed_prefix}/{trimmed_name}")
    }
}

/// MIME type used when uploading an asset, chosen by file extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit('/')
        .next()
        .and_then(|file_name| file_name.rsplit_once('.'))
        .map(|(_, extension)| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("js") | Some("mjs") => "application/javascript",
        Some("css") => "text/css",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        Some("yaml") | Some("yml") => "application/x-yaml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_prefix_and_name_with_single_separator() {
        assert_eq!(join_object_key("ui/", "/index.html"), "ui/index.html");
        assert_eq!(join_object_key("/nested/ui", "static/app.js"), "nested/ui/static/app.js");
    }

    #[test]
    fn empty_prefix_yields_bare_name() {
        assert_eq!(join_object_key("", "index.html"), "index.html");
        assert_eq!(join_object_key("/", "index.html"), "index.html");
    }

    #[test]
    fn resolves_content_type_by_extension() {
        assert_eq!(content_type_for_key("ui/index.HTML"), "text/html");
        assert_eq!(content_type_for_key("static/js/main.3f2a.js"), "application/javascript");
        assert_eq!(content_type_for_key("templates/stack.template.json"), "application/json");
        assert_eq!(content_type_for_key("favicon.ico"), "image/x-icon");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back_to_binary() {
        assert_eq!(content_type_for_key("LICENSE"), "application/octet-stream");
        assert_eq!(content_type_for_key("dir.v2/README"), "application/octet-stream");
        assert_eq!(content_type_for_key("archive.tar.zst"), "application/octet-stream");
    }
}
