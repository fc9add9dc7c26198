use anyhow::{Context, Result};
use pypi_json::{PypiJsonClient, WheelTag};
use std::io::Write;

/// Prints the full metadata document as pretty JSON.
pub(crate) async fn metadata(
    client: &PypiJsonClient,
    project: &str,
    version: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let metadata = client.get_metadata(project, version).await?;
    let rendered = serde_json::to_string_pretty(&metadata).context("failed to render metadata")?;
    writeln!(out, "{}", rendered)?;
    Ok(())
}

/// Prints the highest release version.
pub(crate) async fn latest(client: &PypiJsonClient, project: &str, out: &mut impl Write) -> Result<()> {
    let metadata = client.get_metadata(project, None).await?;
    writeln!(out, "{}", metadata.latest_version()?)?;
    Ok(())
}

/// Prints the version to download URL mapping, optionally with sha256 digests.
pub(crate) async fn releases(
    client: &PypiJsonClient,
    project: &str,
    digests: bool,
    out: &mut impl Write,
) -> Result<()> {
    let metadata = client.get_metadata(project, None).await?;

    let rendered = if digests {
        serde_json::to_string_pretty(&metadata.releases_with_digests()?)
    } else {
        serde_json::to_string_pretty(&metadata.releases()?)
    }
    .context("failed to render releases")?;

    writeln!(out, "{}", rendered)?;
    Ok(())
}

/// Prints `tag<TAB>url` for every wheel tag, then one line per non-wheel URL.
///
/// With `supported` tags, prints only the URL of the first one the release
/// offers instead.
pub(crate) async fn wheels(
    client: &PypiJsonClient,
    project: &str,
    version: Option<&str>,
    supported: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let metadata = client.get_metadata(project, None).await?;
    let index = metadata
        .wheel_tag_mapping(version)
        .with_context(|| format!("failed to resolve wheels for {}", project))?;

    if !supported.is_empty() {
        let tags = supported
            .iter()
            .map(|tag| tag.parse::<WheelTag>())
            .collect::<pypi_json::Result<Vec<_>>>()?;
        let url = index
            .best_match(&tags)
            .with_context(|| format!("no wheel of {} matches {}", project, supported.join(", ")))?;
        writeln!(out, "{}", url)?;
        return Ok(());
    }

    for (tag, url) in index.sorted_tags() {
        writeln!(out, "{}\t{}", tag, url)?;
    }
    for url in &index.other_urls {
        writeln!(out, "{}", url)?;
    }
    Ok(())
}
