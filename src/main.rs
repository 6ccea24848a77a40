use anyhow::{bail, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use profile_query::compile_filter;
use profile_query::config::ServiceConfig;
use profile_query::links::PageEnvelope;
use profile_query::page::PageResult;
use profile_query::sql_compiler::SqlCompiler;

const DEFAULT_CONFIG: &str = "query_config.json";

/// 加载配置，失败时使用默认配置
fn load_config() -> ServiceConfig {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    match ServiceConfig::from_json_file(&path) {
        Ok(config) => {
            log::info!("loaded configuration from {}", path);
            config
        }
        Err(e) => {
            log::warn!("{}, falling back to the built-in profile configuration", e);
            ServiceConfig::default()
        }
    }
}

struct Session {
    config: ServiceConfig,
    entity: String,
}

impl Session {
    fn handle(&mut self, line: &str) -> Result<()> {
        let mut words = line.split_whitespace();
        match words.next() {
            Some(":entity") => {
                let name = words.next().context("usage: :entity <name>")?;
                self.config.entity(name)?;
                self.entity = name.to_string();
                println!("entity: {}", self.entity);
            }
            Some(":page") => {
                let mut next_number = |what: &str| -> Result<u64> {
                    let word = words.next().with_context(|| format!("missing {}", what))?;
                    word.parse().with_context(|| format!("invalid {} '{}'", what, word))
                };
                let number = next_number("page number")?;
                let size = next_number("page size")?;
                let total = next_number("total")?;
                if size == 0 {
                    bail!("page size must be at least 1");
                }
                self.show_page(number, size, total)?;
            }
            Some(cmd) if cmd.starts_with(':') => bail!("unknown command {}", cmd),
            _ => self.show_query(line)?,
        }
        Ok(())
    }

    /// 编译过滤表达式并打印生成的 SQL
    fn show_query(&self, query: &str) -> Result<()> {
        let entity = self.config.entity(&self.entity)?;
        match compile_filter(Some(query), &entity.fields) {
            Ok(filter) => {
                let page = self.config.pagination.request(None, None);
                let compiled = SqlCompiler::new(entity.table.as_str()).compile(&filter, page);
                println!("{}", compiled.select);
                println!("{}", compiled.count);
                for opt in &compiled.optimizations {
                    println!("  • {:?}", opt);
                }
            }
            Err(e) => {
                println!("{} {}", e.status(), serde_json::to_string_pretty(&e.body())?);
            }
        }
        Ok(())
    }

    /// 模拟一页结果并打印响应信封
    fn show_page(&self, number: u64, size: u64, total: u64) -> Result<()> {
        let request = self.config.pagination.request(Some(number), Some(size));
        if request.size != size {
            println!("page size clamped to {}", request.size);
        }
        let start = request.offset().min(total);
        let end = total.min(start.saturating_add(request.size));
        let page = PageResult::new((start..end).collect::<Vec<u64>>(), total, request);

        let base = self.config.entity_url(&self.entity)?;
        let envelope = PageEnvelope::from_page(page, &base);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config();
    let entity = if config.entities.contains_key("profile") {
        "profile".to_string()
    } else {
        config
            .entities
            .keys()
            .next()
            .cloned()
            .context("configuration defines no entities")?
    };

    println!("--- profile_query: filter → SQL ---");
    println!("commands: <filter query> | :entity <name> | :page <number> <size> <total> | :quit");

    let mut session = Session { config, entity };
    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline(&format!("{}> ", session.entity)) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;
                if line == ":quit" || line == ":q" {
                    break;
                }
                if let Err(e) = session.handle(line) {
                    println!("error: {:#}", e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
