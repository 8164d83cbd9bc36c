//! Snapshot → table rows + binding index.
//!
//! One summary row per repository toggles a collapsed group of detail rows,
//! one per commit. Each commit's checkbox id is synthesized by the index at
//! the moment the checkbox is built, so every rendered checkbox has exactly
//! one binding.

use crate::dashboard::index::{BindingEntry, BindingIndex};
use crate::dashboard::markup::Element;
use crate::models::{Commit, Repository};

pub const SUMMARY_ROW_CLASS: &str = "repo-summary";
pub const DETAIL_ROW_CLASS: &str = "commit-detail";
pub const CHECKBOX_CLASS: &str = "checkbox";

#[derive(Debug)]
pub struct RenderedView {
    pub tbody: Element,
    pub index: BindingIndex,
}

/// Consumes the snapshot; only the markup and the index outlive this call.
pub fn render(snapshot: Vec<Repository>) -> RenderedView {
    let mut index = BindingIndex::default();
    let mut tbody = Element::new("tbody").attr("id", "tbody-id");

    for (repo_index, repo) in snapshot.into_iter().enumerate() {
        tbody.push(summary_row(repo_index, &repo));

        for (commit_index, commit) in repo.commits.iter().enumerate() {
            tbody.push(detail_row(&mut index, repo_index, commit_index, &repo.id, commit));
        }
    }

    tracing::debug!(bindings = index.len(), "dashboard rendered");

    RenderedView { tbody, index }
}

fn summary_row(repo_index: usize, repo: &Repository) -> Element {
    Element::new("tr")
        .attr("class", SUMMARY_ROW_CLASS)
        .attr("data-toggle", "collapse")
        .attr("data-target", format!(".order{}", repo_index))
        .child(Element::new("td").text(">"))
        .child(
            Element::new("td").child(
                Element::new("a")
                    .attr("href", repo.url.as_str())
                    .attr("target", "_blank")
                    .text(format!("{} ({})", repo.name, repo.commits.len())),
            ),
        )
}

fn detail_row(
    index: &mut BindingIndex,
    repo_index: usize,
    commit_index: usize,
    repo_id: &str,
    commit: &Commit,
) -> Element {
    Element::new("tr")
        .attr("class", format!("collapse order{} {}", repo_index, DETAIL_ROW_CLASS))
        .child(Element::new("td").text((commit_index + 1).to_string()))
        .child(Element::new("td"))
        .child(
            Element::new("td").child(
                Element::new("a")
                    .attr("href", commit.link.as_str())
                    .attr("target", "_blank")
                    .text(commit.name.as_str()),
            ),
        )
        .child(
            Element::new("td")
                .child(
                    Element::new("span")
                        .attr("class", "additions")
                        .attr("style", "color: green")
                        .text(format!("+{}", commit.additions)),
                )
                .text(" / ")
                .child(
                    Element::new("span")
                        .attr("class", "deletions")
                        .attr("style", "color: red")
                        .text(format!("-{}", commit.deletions)),
                ),
        )
        .child(Element::new("td").text(commit.last_modified.clone().unwrap_or_default()))
        .child(Element::new("td").child(viewed_checkbox(index, repo_index, commit_index, repo_id, commit)))
}

fn viewed_checkbox(
    index: &mut BindingIndex,
    repo_index: usize,
    commit_index: usize,
    repo_id: &str,
    commit: &Commit,
) -> Element {
    let id = index.bind(
        repo_index,
        commit_index,
        BindingEntry {
            repo_id: repo_id.to_string(),
            commit_sha: commit.sha.clone(),
        },
    );

    Element::new("input")
        .attr("class", format!("form-check-input {}", CHECKBOX_CLASS))
        .attr("type", "checkbox")
        .attr("id", id.as_str())
        .flag("checked", commit.viewed)
}

/// Standalone page around a rendered `<tbody>`.
pub fn document(tbody: &Element) -> String {
    let header = ["", "Repository", "Commit", "Changes", "Last modified", "Viewed"]
        .into_iter()
        .fold(Element::new("tr"), |row, title| row.child(Element::new("th").text(title)));

    let page = Element::new("html")
        .child(
            Element::new("head")
                .child(Element::new("meta").attr("charset", "utf-8"))
                .child(Element::new("title").text("Commit news")),
        )
        .child(
            Element::new("body").child(
                Element::new("table")
                    .attr("class", "table")
                    .child(Element::new("thead").child(header))
                    .child(tbody.clone()),
            ),
        );

    format!("<!DOCTYPE html>\n{}\n", page)
}
