use anyhow::{Context, Result, bail};
use overmark_engine::render_document;

/// Renders a markdown file to the markup a host preview layer would show.
/// `--active-line N` renders line N as raw text, the way the editor shows
/// the line under the caret.
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: overmark-cli <file> [--active-line N]")?;

    let mut active_line = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--active-line" => {
                let value = args.next().context("--active-line needs a line number")?;
                active_line = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid line number: {value}"))?,
                );
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    let text = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    println!("{}", render_document(&text, active_line));
    Ok(())
}
