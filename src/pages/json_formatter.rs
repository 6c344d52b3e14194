use leptos::prelude::*;
use leptos::ev;
use log::{info, warn};

use crate::components::graph_view::GraphView;
use crate::formatter::{INDENT_CHOICES, JsonToolError, format_json, minify_json, parse_json};
use crate::json_graph::{JsonGraph, json_to_graph};

const SAMPLE: &str = r#"{
  "name": "tools-manager",
  "version": 3,
  "private": true,
  "author": { "name": "Ada", "email": "ada@example.com" },
  "tools": [
    { "id": "pdf-merge", "enabled": true, "limits": { "files": 20 } },
    { "id": "json-formatter", "enabled": true },
    { "id": "qr", "enabled": false }
  ],
  "tags": ["pdf", "image", "json"]
}"#;

/// JSON formatter with a live graph of the document structure.
#[component]
pub fn JsonFormatter() -> impl IntoView {
	let (text, set_text) = signal(SAMPLE.to_string());
	let (indent, set_indent) = signal(INDENT_CHOICES[0]);

	let parsed = Memo::new(move |_| parse_json(&text.get()));
	// A parse error keeps the last good graph on screen.
	let graph = Memo::new(move |prev: Option<&JsonGraph>| match parsed.get() {
		Ok(value) => json_to_graph(&value),
		Err(err) => {
			warn!("graph not updated: {}", err);
			prev.cloned().unwrap_or_default()
		}
	});

	let rewrite = move |result: Result<String, JsonToolError>| match result {
		Ok(out) => set_text.set(out),
		Err(err) => warn!("cannot rewrite input: {}", err),
	};
	let on_format = move |_: ev::MouseEvent| {
		info!("formatting with indent {}", indent.get_untracked());
		rewrite(format_json(&text.get_untracked(), indent.get_untracked()));
	};
	let on_minify = move |_: ev::MouseEvent| rewrite(minify_json(&text.get_untracked()));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="json-formatter">
				<section class="json-input">
					<h1>"JSON Formatter"</h1>
					<textarea
						spellcheck="false"
						prop:value=text
						on:input=move |ev| set_text.set(event_target_value(&ev))
					/>
					<div class="json-actions">
						<label>
							"Indent "
							<select on:change=move |ev| {
								if let Ok(n) = event_target_value(&ev).parse::<usize>() {
									set_indent.set(n);
								}
							}>
								{INDENT_CHOICES
									.iter()
									.map(|&n| {
										view! {
											<option value=n.to_string() selected=move || indent.get() == n>
												{n}
											</option>
										}
									})
									.collect_view()}
							</select>
						</label>
						<button on:click=on_format>"Format"</button>
						<button on:click=on_minify>"Minify"</button>
						<span class="json-stats">
							{move || {
								graph.with(|g| format!("{} nodes, {} edges", g.nodes.len(), g.edges.len()))
							}}
						</span>
					</div>
					{move || {
						parsed
							.with(|r| r.as_ref().err().map(|e| e.to_string()))
							.map(|msg| view! { <p class="json-error">{msg}</p> })
					}}
				</section>

				<section class="json-graph">
					<GraphView data=graph />
				</section>
			</div>
		</ErrorBoundary>
	}
}
