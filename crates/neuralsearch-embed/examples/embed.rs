use neuralsearch_core::config::Config;
use neuralsearch_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings.embedder)?;
    let texts = vec!["what is a bank transit number".to_string(), "semantic search".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    Ok(())
}
