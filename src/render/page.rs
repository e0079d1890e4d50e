//! The full panel page: status, alert, form, controls, search, table.

use serde::Serialize;

use super::escape::{escape_attr, escape_html};
use super::rows::{placeholder_row, render_rows};
use crate::config::APP_NAME;
use crate::form::HospitalForm;
use crate::models::{Hospital, HospitalCategory, HospitalStatus, Teleconsultation};

/// Colour class of the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Ok,
    Warn,
    Bad,
}

impl Tone {
    pub fn as_class(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Bad => "bad",
        }
    }
}

/// Rendered state of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlView {
    pub busy: bool,
    pub label: &'static str,
}

/// What goes in the table body.
#[derive(Debug, Clone)]
pub enum TableBody<'a> {
    Rows(Vec<&'a Hospital>),
    Placeholder(String),
}

impl TableBody<'_> {
    pub fn render(&self) -> String {
        match self {
            Self::Rows(rows) => render_rows(rows),
            Self::Placeholder(message) => placeholder_row(message),
        }
    }
}

/// Everything the page shows. Built by the panel, rendered here.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub status_label: &'a str,
    pub status_tone: Tone,
    pub alert: Option<&'a str>,
    pub form: &'a HospitalForm,
    pub query: &'a str,
    pub save: ControlView,
    pub refresh: ControlView,
    pub body: TableBody<'a>,
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;margin:0;padding:1.5rem;background:#f6f7f9;color:#1c1e21}
header{display:flex;justify-content:space-between;align-items:center;margin-bottom:1rem}
.status{font-weight:600}.status.ok{color:#1a7f37}.status.warn{color:#9a6700}.status.bad{color:#cf222e}
.alert{background:#ffebe9;border:1px solid #cf222e;padding:.75rem 1rem;margin-bottom:1rem;border-radius:6px}
form.panel{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:.75rem;background:#fff;padding:1rem;border-radius:8px}
label{display:flex;flex-direction:column;font-size:.85rem;gap:.25rem}
.actions{grid-column:1/-1;display:flex;gap:.5rem}
.btn{padding:.4rem .9rem;border:1px solid #d0d7de;border-radius:6px;background:#fff;cursor:pointer}
.btn.primary{background:#1f6feb;color:#fff;border-color:#1f6feb}.btn.danger{color:#cf222e}
.btn[disabled]{opacity:.6;cursor:default}
form.inline{display:inline}
table{width:100%;border-collapse:collapse;background:#fff;margin-top:1rem}
th,td{padding:.5rem;border-bottom:1px solid #eaeef2;text-align:left;font-size:.9rem}
td.right{text-align:right;white-space:nowrap}
tr.placeholder td{text-align:center;color:#57606a}
.toolbar{display:flex;gap:.5rem;margin-top:1rem}
"#;

const SCRIPT: &str = r#"
(function(){
  var search = document.getElementById('search');
  var tbody = document.getElementById('tbody');
  var status = document.getElementById('syncStatus');
  function reloadRows(){
    fetch('/rows?q=' + encodeURIComponent(search.value))
      .then(function(r){ return r.text(); })
      .then(function(html){ tbody.innerHTML = html; })
      .catch(function(){});
  }
  search.addEventListener('input', reloadRows);
  document.addEventListener('submit', function(e){
    var f = e.target;
    var msg = f.getAttribute('data-confirm');
    if(msg){
      if(!window.confirm(msg)){ e.preventDefault(); return; }
      f.elements.confirmed.value = 'yes';
    }
    var btn = f.querySelector('button[data-busy-label]');
    if(btn){ btn.disabled = true; btn.textContent = btn.getAttribute('data-busy-label'); }
  });
  try {
    var ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/ws/live');
    ws.onmessage = function(ev){
      var m = JSON.parse(ev.data);
      if(m.type === 'cache_changed'){ reloadRows(); }
      if(m.type === 'status_changed'){ status.textContent = m.label; status.className = 'status ' + m.tone; }
    };
  } catch(_) {}
})();
"#;

fn input(name: &str, label: &str, value: &str, kind: &str, required: bool) -> String {
    format!(
        r#"<label>{label}{star}<input type="{kind}" id="{name}" name="{name}" value="{value}"{req}></label>"#,
        label = escape_html(label),
        star = if required { " *" } else { "" },
        value = escape_attr(value),
        req = if required { " required" } else { "" },
    )
}

fn select<T: std::fmt::Display>(
    name: &str,
    label: &str,
    options: &[T],
    selected: &str,
    placeholder: Option<&str>,
) -> String {
    let mut html = format!(
        r#"<label>{} *<select id="{name}" name="{name}" required>"#,
        escape_html(label)
    );
    if let Some(text) = placeholder {
        html.push_str(&format!(r#"<option value="">{}</option>"#, escape_html(text)));
    }
    for option in options {
        let value = option.to_string();
        let mark = if value == selected { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{mark}>{}</option>"#,
            escape_attr(&value),
            escape_html(&value)
        ));
    }
    html.push_str("</select></label>");
    html
}

fn teleconsultation_radios(selected: &str) -> String {
    let selected = Teleconsultation::from_form(selected);
    let mut html = String::from("<fieldset><legend>Teleconsultation</legend>");
    for option in Teleconsultation::all() {
        let mark = if *option == selected { " checked" } else { "" };
        html.push_str(&format!(
            r#"<label><input type="radio" name="teleconsultation" value="{0}"{mark}>{0}</label>"#,
            option.as_str()
        ));
    }
    html.push_str("</fieldset>");
    html
}

fn button(kind: &str, class: &str, id: &str, control: &ControlView, busy_label: &str) -> String {
    format!(
        r#"<button type="{kind}" class="btn {class}" id="{id}" data-busy-label="{busy}"{disabled}>{label}</button>"#,
        busy = escape_attr(busy_label),
        disabled = if control.busy { " disabled" } else { "" },
        label = escape_html(control.label),
    )
}

/// Render the whole panel page.
pub fn render_page(view: &PageView<'_>) -> String {
    let form = view.form;
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str(r#"<meta name="viewport" content="width=device-width,initial-scale=1">"#);
    html.push_str(&format!("<title>{}</title>", escape_html(APP_NAME)));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body id=\"top\">");

    html.push_str(&format!(
        r#"<header><h1>{}</h1><span id="syncStatus" class="status {}">{}</span></header>"#,
        escape_html(APP_NAME),
        view.status_tone.as_class(),
        escape_html(view.status_label),
    ));

    if let Some(alert) = view.alert {
        html.push_str(&format!(
            r#"<div class="alert" role="alert">{}</div>"#,
            escape_html(alert)
        ));
    }

    html.push_str(r#"<form id="hospitalForm" class="panel" method="post" action="/hospitals/save">"#);
    html.push_str(&format!(
        r#"<input type="hidden" id="id" name="id" value="{}">"#,
        escape_attr(&form.id)
    ));
    html.push_str(&input("name", "Name", &form.name, "text", true));
    html.push_str(&select(
        "status",
        "Status",
        HospitalStatus::all(),
        &form.status,
        Some(super::rows::DASH),
    ));
    html.push_str(&input("country", "Country", &form.country, "text", true));
    html.push_str(&input("city", "City", &form.city, "text", true));
    html.push_str(&select(
        "category",
        "Category",
        HospitalCategory::all(),
        &form.category,
        None,
    ));
    html.push_str(&input("speciality", "Speciality", &form.speciality, "text", false));
    html.push_str(&input("website", "Website", &form.website, "url", false));
    html.push_str(&input("email", "Email", &form.email, "email", false));
    html.push_str(&input("telephone", "Telephone", &form.telephone, "tel", false));
    html.push_str(&teleconsultation_radios(&form.teleconsultation));
    html.push_str(r#"<div class="actions">"#);
    html.push_str(&button("submit", "primary", "saveBtn", &view.save, "Saving…"));
    html.push_str(r##"<a class="btn" id="resetBtn" href="/#top">Reset</a>"##);
    html.push_str("</div></form>");

    html.push_str(r#"<div class="toolbar"><form method="post" action="/refresh" class="inline">"#);
    html.push_str(&button("submit", "", "refreshBtn", &view.refresh, "Loading…"));
    html.push_str("</form>");
    html.push_str(&format!(
        r#"<input type="search" id="search" name="q" placeholder="Search…" value="{}" autocomplete="off">"#,
        escape_attr(view.query)
    ));
    html.push_str("</div>");

    html.push_str("<table><thead><tr>");
    for heading in [
        "Name",
        "Status",
        "Country",
        "City",
        "Category",
        "Speciality",
        "Website",
        "Email",
        "Telephone",
        "Teleconsultation",
        "",
    ] {
        html.push_str(&format!("<th>{heading}</th>"));
    }
    html.push_str("</tr></thead><tbody id=\"tbody\">");
    html.push_str(&view.body.render());
    html.push_str("</tbody></table>");

    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script></body></html>");
    html
}
