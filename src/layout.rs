//! Page layout: the self-contained dashboard HTML and the summary fragment.

use crate::chart::initial_chart;
use crate::interaction::SessionId;
use crate::models::{ChartSpec, ChartTheme, Dataset, Summary};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::sync::Arc;

pub const BANNER_ASSET: &str = "Resource-Page-Books-banner.png";
pub const BACKGROUND_ASSET: &str = "background.jpg";

/// Everything the page needs that is fixed for the life of the process.
///
/// The initial chart and author options are computed once here, never per request.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    theme: ChartTheme,
    initial_chart: ChartSpec,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, theme: ChartTheme) -> Self {
        let initial_chart = initial_chart(&dataset, &theme);
        Self {
            dataset,
            theme,
            initial_chart,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    pub fn initial_chart(&self) -> &ChartSpec {
        &self.initial_chart
    }

    /// Author multi-select options, first-seen order
    pub fn author_options(&self) -> &[String] {
        self.dataset.authors()
    }

    /// Default value of the maximum-pages input
    pub fn default_max_pages(&self) -> u32 {
        self.dataset.max_num_pages()
    }
}

/// Serialize a figure for inline embedding in a `<script>` block.
fn embed_json(value: &serde_json::Value) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    json.replace("</script>", "<\\/script>")
}

fn render_author_options(authors: &[String]) -> String {
    authors
        .iter()
        .map(|a| {
            format!(
                "<option value=\"{}\">{}</option>",
                encode_double_quoted_attribute(a),
                encode_text(a)
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ")
}

/// Render the summary card body shown after an update.
pub fn render_summary(summary: &Summary) -> String {
    format!(
        "<div><p>{}</p><p>{}</p></div>",
        encode_text(&summary.authors_line),
        encode_text(&summary.max_pages_line)
    )
}

/// Render the full dashboard page in its initial (idle) state.
///
/// `session` is echoed back by the page script with every update request.
pub fn render_page(dashboard: &Dashboard, session: SessionId) -> String {
    let font_color = &dashboard.theme().font_color;

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Top 10 Books</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        body {{
            background-image: url("/assets/{background}");
            background-size: cover;
            background-position: center;
            padding: 0 150px;
            color: {font_color};
        }}
        h1 {{
            text-align: center;
            font-size: 36px;
            font-family: system-ui;
            margin: 80px;
        }}
        label {{ font-family: system-ui; display: block; margin-top: 10px; margin-bottom: 10px; }}
        #author-dropdown {{ color: #2a2a2b; width: 100%; }}
        #book-graph {{ background-color: transparent; margin-bottom: 30px; }}
        #book-graph-container {{ margin-bottom: 80px; }}
    </style>
</head>
<body>
    <img src="/assets/{banner}" alt="Books" style="width: 100%; max-width: 1300px;">
    <h1>Top 10 Books</h1>
    <div id="book-graph"></div>

    <h1>Select your author/ number of pages</h1>
    <label for="author-dropdown" style="margin-top: 50px;">Select an author:</label>
    <select id="author-dropdown" multiple size="8">
                {author_options}
    </select>
    <label for="max-pages-input">Enter a maximum number of pages:</label>
    <input id="max-pages-input" type="number" value="{max_pages}">
    <button id="update-button" type="button" class="btn btn-primary mb-3">Update Graph</button>

    <div id="book-graph-container" style="display: none;"></div>

    <div class="card" style="width: 18rem; margin: auto;">
        <div class="card-body">
            <h4 class="card-title">Selected Books</h4>
            <div id="selected-books-info"></div>
        </div>
    </div>

    <script type="text/javascript">
        window.__INITIAL_FIGURE__ = {initial_figure};
        window.__SESSION__ = {session};
    </script>
    <script type="text/javascript">
{client_app}
    </script>
</body>
</html>"##,
        background = BACKGROUND_ASSET,
        banner = BANNER_ASSET,
        font_color = font_color,
        author_options = render_author_options(dashboard.author_options()),
        max_pages = dashboard.default_max_pages(),
        initial_figure = embed_json(&dashboard.initial_chart().to_plotly()),
        session = session,
        client_app = CLIENT_APP_CODE,
    )
}

/// Embedded page script: draws the initial chart and posts update requests.
const CLIENT_APP_CODE: &str = r##"
(function () {
    let nClicks = 0;
    const session = window.__SESSION__;
    const fig = window.__INITIAL_FIGURE__;
    Plotly.newPlot('book-graph', fig.data, fig.layout);

    function readMaxPages() {
        const raw = document.getElementById('max-pages-input').value;
        if (raw === '') return null;
        const n = Number(raw);
        return Number.isNaN(n) ? raw : n;
    }

    function readAuthors() {
        const select = document.getElementById('author-dropdown');
        return Array.from(select.selectedOptions).map(o => o.value);
    }

    function apply(outcome) {
        const container = document.getElementById('book-graph-container');
        const info = document.getElementById('selected-books-info');
        container.style.display = outcome.display.chart_visible ? 'block' : 'none';
        if (outcome.figure) {
            Plotly.react(container, outcome.figure.data, outcome.figure.layout);
        }
        info.innerHTML = outcome.summary_html || '';
        if (outcome.diagnostic) {
            console.warn('update rejected:', outcome.diagnostic);
        }
    }

    document.getElementById('update-button').addEventListener('click', async () => {
        nClicks += 1;
        const response = await fetch('/_update', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({
                session: session,
                n_clicks: nClicks,
                authors: readAuthors(),
                max_pages: readMaxPages(),
            }),
        });
        if (response.ok) {
            apply(await response.json());
        }
    });
})();
"##;
