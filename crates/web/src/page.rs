use crate::ROOT_CONTAINER;

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto}\
    li{display:flex;gap:.5rem;align-items:center;margin:.25rem 0}\
    li span{flex:1}form{margin:0}";

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Listing page with an upload form and per-file download/delete buttons.
pub fn render_index(paths: &[String]) -> String {
    let mut items = String::new();
    for path in paths {
        let query = urlencoding::encode(path);
        let label = html_escape(path);
        items.push_str(&format!(
            "<li><span>{label}</span>\
             <form method=\"post\" action=\"/download?path={query}\"><button>Download</button></form>\
             <form method=\"post\" action=\"/delete?path={query}\"><button>Delete</button></form></li>\n"
        ));
    }
    if paths.is_empty() {
        items.push_str("<li><em>No files yet.</em></li>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{ROOT_CONTAINER}</title>\
         <style>{STYLE}</style></head>\n<body>\n<h1>{ROOT_CONTAINER}</h1>\n\
         <form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"file\"> <button>Upload</button></form>\n\
         <ul>\n{items}</ul>\n</body>\n</html>\n"
    )
}
