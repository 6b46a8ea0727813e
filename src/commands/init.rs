use std::path::Path;

use log::info;

use crate::{
    InitArgs,
    commands::absolute,
    config::{CONFIG_FILE, Config, ContentConfig, DevConfig, MarkdownConfig, PaginateConfig, SiteConfig},
};

const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{% if page.title %}{{ page.title }} | {% endif %}{{ site.title }}</title>
  <link rel="stylesheet" href="{{ site.baseurl }}/assets/css/style.css">
</head>
<body>
  <header><a href="{{ site.baseurl }}/">{{ site.title }}</a></header>
  <main>
{{ content }}
  </main>
{% if quill.live_reload %}
  <script>
    new EventSource("/_quill/live-reload").addEventListener("reload", () => location.reload());
  </script>
{% endif %}
</body>
</html>
"#;

const POST_LAYOUT: &str = r#"---
layout: default
---
<article>
  <h1>{{ page.title }}</h1>
  {% if page.date %}<time datetime="{{ page.date }}">{{ page.date | date(format="%B %-d, %Y") }}</time>{% endif %}
{{ content }}
</article>
<nav>
  {% if page.next %}<a href="{{ page.next.url }}">&larr; {{ page.next.title }}</a>{% endif %}
  {% if page.previous %}<a href="{{ page.previous.url }}">{{ page.previous.title }} &rarr;</a>{% endif %}
</nav>
"#;

const INDEX_LAYOUT: &str = r#"---
layout: default
---
{% for post in paginator.posts %}
<article>
  <h2><a href="{{ post.url }}">{{ post.title }}</a></h2>
  {{ post.excerpt }}
</article>
{% endfor %}
<nav>
  {% if paginator.previous_page_path %}<a href="{{ paginator.previous_page_path }}">Newer</a>{% endif %}
  <span>Page {{ paginator.page }} of {{ paginator.total_pages }}</span>
  {% if paginator.next_page_path %}<a href="{{ paginator.next_page_path }}">Older</a>{% endif %}
</nav>
"#;

const FIRST_POST: &str = r#"---
title: Hello, world
tags: [meta]
---
This is the first post. Everything above the first blank line is the excerpt.

Edit or delete it in `_posts/`, then run `quill serve` to see changes live.
"#;

const ABOUT_PAGE: &str = r#"---
title: About
---
# About

This site is built with quill.
"#;

const STYLESHEET: &str = r#"body {
  max-width: 42rem;
  margin: 2rem auto;
  padding: 0 1rem;
  font-family: system-ui, sans-serif;
  line-height: 1.6;
}
"#;

pub fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = absolute(&args.path)?;

    if !path.exists() {
        if args.create {
            std::fs::create_dir_all(&path)?;
            info!("Created directory {}", path.display());
        } else {
            anyhow::bail!("Directory does not exist: {}", path.display());
        }
    }
    if path.join(CONFIG_FILE).exists() {
        anyhow::bail!("{} already exists in {}", CONFIG_FILE, path.display());
    }

    info!("Initializing site in {}", path.display());
    scaffold(&path)?;
    info!("Created {}", path.join(CONFIG_FILE).display());

    Ok(())
}

fn scaffold(path: &Path) -> Result<(), anyhow::Error> {
    let config = Config {
        site: SiteConfig {
            title: "My Quill Site".into(),
            url: Some("https://example.com".into()),
            baseurl: String::new(),
            description: None,
            author: None,
            output: "_site".into(),
            extra: Default::default(),
        },
        content: ContentConfig {
            post_layout: Some("post".into()),
            ..Default::default()
        },
        paginate: Some(PaginateConfig::default()),
        markdown: MarkdownConfig::default(),
        dev: DevConfig::default(),
    };
    std::fs::write(path.join(CONFIG_FILE), serde_yaml::to_string(&config)?)?;

    let date = chrono::Local::now().format("%Y-%m-%d");
    let files = [
        ("_layouts/default.html".to_string(), DEFAULT_LAYOUT),
        ("_layouts/post.html".to_string(), POST_LAYOUT),
        ("_layouts/index.html".to_string(), INDEX_LAYOUT),
        (format!("_posts/{}-hello-world.md", date), FIRST_POST),
        ("about.md".to_string(), ABOUT_PAGE),
        ("assets/css/style.css".to_string(), STYLESHEET),
    ];
    for (relative, content) in files {
        let file = path.join(relative);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(file, content)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Builder;

    #[test]
    fn test_scaffold_builds() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path()).unwrap();

        let config = Config::load_from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        let result = Builder::new(config, dir.path().to_path_buf())
            .build()
            .unwrap();

        assert!(!result.has_failures());
        assert_eq!(result.documents, 2);
        assert_eq!(result.index_pages, 1);
        assert!(result.missing_assets.is_empty());

        let home = std::fs::read_to_string(dir.path().join("_site/index.html")).unwrap();
        assert!(home.contains("Hello, world"));
        assert!(!home.contains("EventSource"));
        assert!(dir.path().join("_site/about/index.html").exists());
        assert!(dir.path().join("_site/assets/css/style.css").exists());
    }

    #[test]
    fn test_live_reload_script_in_dev_mode() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path()).unwrap();

        let config = Config::load_from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        Builder::new(config, dir.path().to_path_buf())
            .with_dev_mode(true)
            .with_live_reload(true)
            .build()
            .unwrap();

        let about = std::fs::read_to_string(dir.path().join("_site/about/index.html")).unwrap();
        assert!(about.contains("/_quill/live-reload"));
    }
}
