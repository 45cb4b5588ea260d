//! Glossa CLI - import tokenized articles and annotate them

mod io;

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use glossa_core::{SentenceAddress, Source, TokenAddress};

fn parse_uuid(arg: &str) -> Result<Uuid> {
    Uuid::parse_str(arg).with_context(|| format!("Invalid article id: {arg}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    match command {
        Some("import") => import(args.get(1).map(String::as_str)),
        Some("list") => list(),
        Some("show") => show(&args[1..]),
        Some("define") => define(&args[1..]),
        Some("grammar") => grammar(&args[1..]),
        Some("ask") => ask(&args[1..]),
        Some("export") => export(&args[1..]),
        Some("delete") => delete(&args[1..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Usage: glossa <command>");
    println!();
    println!("  import <tokenized.json>                         import tokenizer output");
    println!("  list                                            list articles");
    println!("  show <article>                                  print sentences and tokens");
    println!("  define <article> <sentence> <token> <body> <explanation>");
    println!("                                                  annotate a token with vocabulary");
    println!("  grammar <article> <sentence> <name> <explanation> [token..]");
    println!("                                                  annotate a sentence with a rule");
    println!("  ask <article> <sentence> [token]                mark an address as asked");
    println!("  export <article>                                write the article tree as JSON");
    println!("  delete <article>                                delete an article");
}

fn import(path: Option<&str>) -> Result<()> {
    let path = path.ok_or_else(|| anyhow!("Usage: glossa import <tokenized.json>"))?;
    let segmented = io::load_segmented(path)?;

    let mut store = io::load_store()?;
    let article_id = store.import_article(&segmented)?;
    io::save_store(&store)?;

    println!("Imported {} as {}", path, article_id);
    Ok(())
}

fn list() -> Result<()> {
    let store = io::load_store()?;
    for article in store.articles() {
        println!(
            "{}  [{}] {} ({}, {} sentences)",
            article.id,
            article.language,
            article.title,
            article.status.as_str(),
            article.sentence_count()
        );
    }
    Ok(())
}

fn show(args: &[String]) -> Result<()> {
    let article_id = parse_uuid(args.first().ok_or_else(|| anyhow!("Usage: glossa show <article>"))?)?;

    let store = io::load_store()?;
    let article = store
        .article(article_id)
        .ok_or_else(|| anyhow!("No article {article_id}"))?;

    println!("{} ({})", article.title, article.language);
    for sentence in &article.sentences {
        println!("  [{}] {}", sentence.sentence_id, sentence.text);
        for token in &sentence.tokens {
            let address = TokenAddress::new(article_id, sentence.sentence_id, token.sentence_token_id);
            let notated = if store.has_vocab_notation(article.user_id, address) {
                " *"
            } else {
                ""
            };
            println!(
                "      {:>3} {:<12} {}{}",
                token.sentence_token_id,
                token.token_type.as_str(),
                token.body,
                notated
            );
        }
        for notation in store.grammar_notations_for_sentence(
            SentenceAddress::new(article_id, sentence.sentence_id),
            Some(article.user_id),
        ) {
            let name = store
                .grammar_rule(notation.rule_id)
                .map(|r| r.name.as_str())
                .unwrap_or("?");
            println!("      grammar: {} {:?}", name, notation.marked_token_ids);
        }
    }
    Ok(())
}

fn define(args: &[String]) -> Result<()> {
    if args.len() < 5 {
        bail!("Usage: glossa define <article> <sentence> <token> <body> <explanation>");
    }
    let article_id = parse_uuid(&args[0])?;
    let sentence_id: u32 = args[1].parse().context("Invalid sentence id")?;
    let token_id: u32 = args[2].parse().context("Invalid token id")?;
    let body = &args[3];
    let explanation = &args[4];

    let mut store = io::load_store()?;
    let article = store
        .article(article_id)
        .ok_or_else(|| anyhow!("No article {article_id}"))?;
    let user_id = article.user_id;
    let language = article.language.clone();
    let address = TokenAddress::new(article_id, sentence_id, token_id);

    let entry = store.get_or_create_vocab_entry(
        user_id,
        body,
        explanation,
        Some(language),
        Source::Manual,
    )?;
    store.notate_vocab(user_id, address)?;
    store.link_vocab_notation(user_id, address, entry.record.id)?;
    store.add_vocab_example(entry.record.id, address.sentence(), explanation, &[token_id])?;
    store.mark_asked(user_id, address.sentence(), Some(token_id), None)?;
    io::save_store(&store)?;

    println!("Defined `{}` at {}", body, address);
    Ok(())
}

fn grammar(args: &[String]) -> Result<()> {
    if args.len() < 4 {
        bail!("Usage: glossa grammar <article> <sentence> <name> <explanation> [token..]");
    }
    let article_id = parse_uuid(&args[0])?;
    let sentence_id: u32 = args[1].parse().context("Invalid sentence id")?;
    let name = &args[2];
    let explanation = &args[3];
    let marked: Vec<u32> = args[4..]
        .iter()
        .map(|a| a.parse().context("Invalid token id"))
        .collect::<Result<_>>()?;

    let mut store = io::load_store()?;
    let article = store
        .article(article_id)
        .ok_or_else(|| anyhow!("No article {article_id}"))?;
    let user_id = article.user_id;
    let language = article.language.clone();
    let address = SentenceAddress::new(article_id, sentence_id);

    let rule = store.get_or_create_grammar_rule(
        user_id,
        name,
        explanation,
        None,
        Some(language),
        Source::Manual,
    )?;
    store.notate_grammar(user_id, address, rule.record.id, &marked)?;
    store.add_grammar_example(rule.record.id, address, explanation, &marked)?;
    io::save_store(&store)?;

    println!("Noted `{}` on {}", name, address);
    Ok(())
}

fn ask(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("Usage: glossa ask <article> <sentence> [token]");
    }
    let article_id = parse_uuid(&args[0])?;
    let sentence_id: u32 = args[1].parse().context("Invalid sentence id")?;
    let token_id: Option<u32> = match args.get(2) {
        Some(raw) => Some(raw.parse().context("Invalid token id")?),
        None => None,
    };

    let mut store = io::load_store()?;
    let article = store
        .article(article_id)
        .ok_or_else(|| anyhow!("No article {article_id}"))?;
    let user_id = article.user_id;

    let marked = store.mark_asked(
        user_id,
        SentenceAddress::new(article_id, sentence_id),
        token_id,
        None,
    )?;
    io::save_store(&store)?;

    if marked.created {
        println!("Marked as asked ({})", marked.record.kind.as_str());
    } else {
        println!("Already asked ({})", marked.record.kind.as_str());
    }
    Ok(())
}

fn export(args: &[String]) -> Result<()> {
    let article_id = parse_uuid(args.first().ok_or_else(|| anyhow!("Usage: glossa export <article>"))?)?;

    let store = io::load_store()?;
    let article = store
        .article(article_id)
        .ok_or_else(|| anyhow!("No article {article_id}"))?;
    let path = io::export_article(article)?;

    println!("Exported to {}", path.display());
    Ok(())
}

fn delete(args: &[String]) -> Result<()> {
    let article_id = parse_uuid(args.first().ok_or_else(|| anyhow!("Usage: glossa delete <article>"))?)?;

    let mut store = io::load_store()?;
    if store.delete_article(article_id) {
        io::save_store(&store)?;
        println!("Deleted {}", article_id);
    } else {
        println!("No article {}", article_id);
    }
    Ok(())
}
