//! Consolidated HTML session document
//!
//! Collects the session header, the statistics table, the findings and the
//! charts already rendered for the session into one `report.html` with
//! embedded CSS. Chart images are inlined as base64 `data:` URIs so the
//! document stands alone; a figure whose image bytes are unavailable falls
//! back to its relative file name.

use crate::report::SessionAnalysis;
use base64::{engine::general_purpose, Engine as _};
use crate::synthesis::CLOSING_REMARK;

/// One chart included in the document
#[derive(Debug, Clone)]
pub struct HtmlFigure {
    pub file: String,
    pub caption: String,
    /// PNG bytes to inline
    pub png: Option<Vec<u8>>,
}

/// HTML document builder for one session
#[derive(Debug)]
pub struct HtmlReport<'a> {
    analysis: &'a SessionAnalysis<'a>,
    figures: Vec<HtmlFigure>,
}

impl<'a> HtmlReport<'a> {
    pub fn new(analysis: &'a SessionAnalysis<'a>) -> Self {
        Self {
            analysis,
            figures: Vec::new(),
        }
    }

    /// Append a chart linked by file name, shown in insertion order
    pub fn add_figure(&mut self, file: &str, caption: &str) {
        self.figures.push(HtmlFigure {
            file: file.to_string(),
            caption: caption.to_string(),
            png: None,
        });
    }

    /// Append a chart inlined from its PNG bytes
    pub fn add_embedded_figure(&mut self, file: &str, caption: &str, png: Vec<u8>) {
        self.figures.push(HtmlFigure {
            file: file.to_string(),
            caption: caption.to_string(),
            png: Some(png),
        });
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px 10px;
            text-align: right;
        }
        th {
            background-color: #4a90d9;
            color: white;
        }
        td.column {
            text-align: left;
            font-family: monospace;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
        .session {
            color: #555;
        }
        figure {
            background-color: white;
            margin: 0 0 20px 0;
            padding: 10px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        figure img {
            max-width: 100%;
        }
        figcaption {
            font-weight: bold;
            color: #333;
            margin-top: 6px;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    fn render_session(&self) -> String {
        let table = self.analysis.table;
        let range = match table.time_range() {
            Some((start, end)) => format!("{:.2} to {:.2} s", start, end),
            None => "n/a".to_string(),
        };
        format!(
            "    <p class=\"session\">{} &middot; {} rows, {} columns &middot; {}</p>\n",
            Self::escape_html(table.name()),
            table.row_count(),
            table.column_count(),
            range
        )
    }

    fn render_statistics(&self) -> String {
        let mut html = String::new();
        html.push_str("    <h2>Statistics</h2>\n");
        html.push_str("    <table>\n");
        html.push_str(
            "        <tr><th>column</th><th>mean</th><th>std</th><th>min</th><th>max</th></tr>\n",
        );
        for (name, s) in self.analysis.statistics.iter() {
            html.push_str(&format!(
                "        <tr><td class=\"column\">{}</td><td>{:.3}</td><td>{:.3}</td><td>{:.3}</td><td>{:.3}</td></tr>\n",
                Self::escape_html(name),
                s.mean,
                s.std,
                s.min,
                s.max
            ));
        }
        html.push_str("    </table>\n");
        html
    }

    fn render_findings(&self) -> String {
        let mut html = String::new();
        html.push_str("    <h2>Automatic synthesis</h2>\n");
        html.push_str("    <ul>\n");
        for finding in &self.analysis.findings {
            html.push_str(&format!(
                "        <li>{}</li>\n",
                Self::escape_html(&finding.to_string())
            ));
        }
        html.push_str(&format!("        <li>{}</li>\n", CLOSING_REMARK));
        html.push_str("    </ul>\n");
        html
    }

    fn render_figure(figure: &HtmlFigure) -> String {
        let src = match &figure.png {
            Some(png) => format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png)),
            None => Self::escape_html(&figure.file),
        };
        let caption = Self::escape_html(&figure.caption);
        format!(
            "    <figure>\n        <img src=\"{}\" alt=\"{}\" title=\"{}\">\n        <figcaption>{}</figcaption>\n    </figure>\n",
            src,
            caption,
            Self::escape_html(&figure.file),
            caption
        )
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str(&format!(
            "    <title>Mouse Session Report: {}</title>\n",
            Self::escape_html(self.analysis.table.name())
        ));
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str("    <h1>Mouse Session Report</h1>\n");
        html.push_str(&self.render_session());
        html.push_str(&self.render_statistics());
        html.push_str(&self.render_findings());

        if !self.figures.is_empty() {
            html.push_str("    <h2>Charts</h2>\n");
            for figure in &self.figures {
                html.push_str(&Self::render_figure(figure));
            }
        }

        html.push_str("    <div class=\"footer\">\n");
        html.push_str("        Generated by mouse-metrics\n");
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
    }
}
