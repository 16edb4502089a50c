pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// The shared document frame every page hands its content to. The stylesheet
// is served by the front proxy alongside the login collaborator.
pub fn page_shell(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/bootstrap.min.css\">\n\
         </head>\n\
         <body>\n\
         <div class=\"container\">\n\
         {}\n\
         </div>\n\
         </body>\n\
         </html>\n",
        escape_html(title),
        content
    )
}

pub fn table(header_cells: &[&str], body_rows: &str) -> String {
    let mut thead = String::new();
    for cell in header_cells {
        thead.push_str("<th>");
        thead.push_str(&escape_html(cell));
        thead.push_str("</th>");
    }

    format!(
        "<table class=\"table table-striped table-responsive table-hover\">\n\
         <thead>\n<tr>{}</tr>\n</thead>\n\
         <tbody>\n{}</tbody>\n\
         </table>",
        thead, body_rows
    )
}

pub fn text_cell(value: &str) -> String {
    format!("<td>{}</td>", escape_html(value))
}

pub fn status_cell(label: &str, color: &str) -> String {
    format!("<td style=\"color: {};\">{}</td>", color, label)
}

pub fn link_cell(href: &str, text: &str) -> String {
    format!(
        "<td><a href=\"{}\">{}</a></td>",
        escape_html(href),
        escape_html(text)
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    let content = format!(
        "<h3 class=\"page-header\">{}</h3>\n<p class=\"lead\">{}</p>",
        escape_html(title),
        escape_html(message)
    );
    page_shell(title, &content)
}
