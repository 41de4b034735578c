//! HTML pages for the migration portal
//!
//! A handful of format!-rendered pages; no templating engine, these are
//! operator/debug surfaces rather than a real UI. Provider-supplied text
//! (error details, file names) is escaped before it lands in a body.

use axum::response::Html;
use google_drive::CopiedFile;

/// GET / — entry page linking to the admin and user views.
pub fn landing() -> Html<String> {
    Html(
        "<p>Workspace migration portal.</p>\
         <p>See <a href='/admin'>/admin</a> or <a href='/user'>/user</a>.</p>"
            .to_string(),
    )
}

/// GET /admin — deployment debug page showing the configured identifiers.
pub fn admin(
    source_file_id: &str,
    destination_folder_id: &str,
    redirect_uri: &str,
) -> Html<String> {
    Html(format!(
        "<html><body>\
         <h1>Admin</h1>\
         <p>App is running. User page: <a href='/user'>/user</a></p>\
         <h3>Configured IDs (debug only)</h3>\
         <ul>\
         <li>source_file_id: {}</li>\
         <li>destination_folder_id: {}</li>\
         <li>redirect_uri: {}</li>\
         </ul>\
         </body></html>",
        escape(source_file_id),
        escape(destination_folder_id),
        escape(redirect_uri),
    ))
}

/// GET /user — the page that starts the flow.
pub fn user() -> Html<String> {
    Html(
        "<html><body>\
         <h1>Migration</h1>\
         <p>This will copy one configured file into the destination folder \
         after you authorise with Google.</p>\
         <form action='/oauth2/start' method='post'>\
         <button type='submit'>Start migration</button>\
         </form>\
         </body></html>"
            .to_string(),
    )
}

/// Success page for a completed copy.
pub fn copy_success(file: &CopiedFile) -> Html<String> {
    let link = file
        .web_view_link
        .as_deref()
        .map(|l| format!("<p><a href='{}'>Open in Drive</a></p>", escape(l)))
        .unwrap_or_default();
    Html(format!(
        "<html><body>\
         <h1>Copy succeeded</h1>\
         <p>New file ID: {}</p>\
         <p>Name: {}</p>\
         {}\
         </body></html>",
        escape(&file.id),
        escape(file.name.as_deref().unwrap_or("(unnamed)")),
        link,
    ))
}

/// Generic error page used by the flow error responses.
pub fn error(title: &str, detail: &str) -> Html<String> {
    Html(format!(
        "<html><body><h1>{}</h1><p>{}</p></body></html>",
        escape(title),
        escape(detail),
    ))
}

/// Escape text destined for an HTML body or single-quoted attribute.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
