//! HTML views
//!
//! Two pages: the session's PDF index and the page sorter. Both are plain
//! strings built here; the sorter drives the JSON endpoints from the
//! browser. Every name that reaches the markup is escaped, and every name
//! that reaches a URL is percent-encoded.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::files::PdfEntry;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 64rem; color: #222; }
table { border-collapse: collapse; width: 100%; }
th, td { padding: .4rem .6rem; border-bottom: 1px solid #ddd; text-align: left; }
.actions a, .actions button { margin-right: .5rem; }
.viewer { display: flex; gap: 1.5rem; align-items: flex-start; }
.viewer img { max-width: 36rem; border: 1px solid #ccc; }
.panel { flex: 1; }
.error { color: #b00020; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        encode_text(title),
        STYLE,
        body
    )
}

/// Percent-encoded path segment
fn segment(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Listing of the session's PDFs with upload, open, download, sort and
/// delete controls
pub fn index_page(pdfs: &[PdfEntry]) -> String {
    let mut rows = String::new();
    for pdf in pdfs {
        let url = segment(&pdf.name);
        let attr = encode_double_quoted_attribute(&pdf.name);
        rows.push_str(&format!(
            "<tr><td>{name}</td><td>{pages}</td><td class=\"actions\">\
             <a href=\"/open/{url}\" target=\"_blank\">Open</a>\
             <a href=\"/download/{url}\">Download</a>\
             <a href=\"/sorter/{url}\">Sort pages</a>\
             <button type=\"button\" data-name=\"{attr}\" onclick=\"removePdf(this)\">Delete</button>\
             </td></tr>\n",
            name = encode_text(&pdf.name),
            pages = pdf.pages,
            url = url,
            attr = attr,
        ));
    }

    let table = if pdfs.is_empty() {
        "<p>No PDFs uploaded yet.</p>".to_string()
    } else {
        format!(
            "<table>\n<thead><tr><th>Name</th><th>Pages</th><th></th></tr></thead>\n\
             <tbody>\n{}</tbody>\n</table>",
            rows
        )
    };

    let body = format!(
        r#"<h1>PDF Sorter</h1>
<form id="upload" enctype="multipart/form-data">
  <input type="file" name="file" accept=".pdf,application/pdf" required>
  <button type="submit">Upload</button>
  <span id="status"></span>
</form>
{table}
<script>
const status = document.getElementById('status');
document.getElementById('upload').addEventListener('submit', async (event) => {{
  event.preventDefault();
  const response = await fetch('/upload', {{ method: 'POST', body: new FormData(event.target) }});
  const result = await response.json();
  if (result.success) {{ location.reload(); }}
  else {{ status.textContent = result.error; status.className = 'error'; }}
}});
async function removePdf(button) {{
  const name = button.dataset.name;
  if (!confirm('Delete ' + name + '?')) return;
  const deleteSorted = confirm('Also delete its sorted folder?');
  const response = await fetch('/delete/' + encodeURIComponent(name), {{
    method: 'DELETE',
    headers: {{ 'Content-Type': 'application/json' }},
    body: JSON.stringify({{ delete_sorted: deleteSorted }}),
  }});
  const result = await response.json();
  if (result.success) {{ location.reload(); }} else {{ alert(result.error); }}
}}
</script>"#,
        table = table
    );

    page("PDF Sorter", &body)
}

/// Page sorter for one PDF, opened at `start`
pub fn sorter_page(name: &str, start: usize, total: usize) -> String {
    let name_json = serde_json::to_string(name).unwrap_or_else(|_| "\"\"".to_string());
    // keep "</script>" in a name from closing the script element
    let name_json = name_json.replace("</", "<\\/");

    let body = format!(
        r#"<p><a href="/">&larr; All PDFs</a></p>
<h1>{title}</h1>
<div class="viewer">
  <div>
    <img id="page" alt="page preview" src="/page/{url}/{start}">
    <p>
      <button type="button" id="prev">Previous</button>
      Page <span id="current">{start}</span> of {total}
      <button type="button" id="next">Next</button>
    </p>
  </div>
  <div class="panel">
    <h2>New PDF from this page</h2>
    <input id="new-name" placeholder="name">
    <button type="button" id="create">Create</button>
    <p id="name-status"></p>
    <h2>Append this page to</h2>
    <select id="targets"></select>
    <button type="button" id="append">Append</button>
    <p id="append-status"></p>
  </div>
</div>
<script>
const source = {name_json};
const base = encodeURIComponent(source);
const total = {total};
let current = {start};

function show(page) {{
  current = Math.min(Math.max(page, 1), total);
  document.getElementById('page').src = '/page/' + base + '/' + current;
  document.getElementById('current').textContent = current;
  history.replaceState(null, '', '?start=' + current);
}}

async function post(path, payload) {{
  const response = await fetch(path + base, {{
    method: 'POST',
    headers: {{ 'Content-Type': 'application/json' }},
    body: JSON.stringify(payload),
  }});
  return response.json();
}}

async function refreshTargets() {{
  const response = await fetch('/list-sorted/' + base);
  const listing = await response.json();
  const select = document.getElementById('targets');
  select.innerHTML = '';
  for (const pdf of listing.pdfs || []) {{
    const option = document.createElement('option');
    option.value = pdf;
    option.textContent = pdf;
    select.appendChild(option);
  }}
}}

document.getElementById('prev').onclick = () => show(current - 1);
document.getElementById('next').onclick = () => show(current + 1);

document.getElementById('new-name').addEventListener('input', async (event) => {{
  const status = document.getElementById('name-status');
  if (!event.target.value) {{ status.textContent = ''; return; }}
  const check = await post('/check-name/', {{ name: event.target.value }});
  status.textContent = check.valid ? 'Will create ' + check.name : check.error;
  status.className = check.valid ? '' : 'error';
}});

document.getElementById('create').onclick = async () => {{
  const input = document.getElementById('new-name');
  const status = document.getElementById('name-status');
  const result = await post('/create-pdf/', {{ page: current, name: input.value }});
  if (result.success) {{
    status.textContent = 'Created ' + result.path;
    status.className = '';
    input.value = '';
    await refreshTargets();
  }} else {{
    status.textContent = result.error;
    status.className = 'error';
  }}
}};

document.getElementById('append').onclick = async () => {{
  const target = document.getElementById('targets').value;
  const status = document.getElementById('append-status');
  if (!target) return;
  const result = await post('/append-to-pdf/', {{ page: current, target }});
  status.textContent = result.success
    ? target + ' now has ' + result.new_page_count + ' pages'
    : result.error;
  status.className = result.success ? '' : 'error';
}};

refreshTargets();
</script>"#,
        title = encode_text(name),
        url = segment(name),
        start = start,
        total = total,
        name_json = name_json,
    );

    page(&format!("Sort {}", name), &body)
}
