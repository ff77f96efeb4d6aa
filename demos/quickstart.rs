use presentationer::{
    create_session_store, Page, PageKind, Session, SessionBackendConfig, SessionResult,
    SessionStore,
};
use serde_json::json;

fn run_demo(label: &str, store: &dyn SessionStore) -> SessionResult<()> {
    println!("== {label} session demo ==");
    store.create(&Session::new("demo"))?;
    println!("Created session demo");

    store.create_page(
        "demo",
        Page::new("p1", "Intro", PageKind::Code, json!({"source": "fn main() {}"})),
    )?;
    store.create_page(
        "demo",
        Page::new("p2", "Q&A", PageKind::ChatThread, json!([{"role": "user", "text": "hi"}])),
    )?;
    for page in store.get("demo")?.pages {
        println!("  {} {:?} {}", page.id, page.kind, page.title);
    }

    store.save_avatar("demo", "speaker.png", b"\x89PNG\r\n\x1a\n")?;
    println!("Avatars: {:?}", store.list_avatars("demo")?);

    store.delete_page("demo", "p1")?;
    println!("Pages left: {}", store.get("demo")?.pages.len());

    store.rename("demo", "demo-final")?;
    for summary in store.list()? {
        println!("Session {} modified {}", summary.name, summary.last_modified);
    }
    store.delete("demo-final")?;
    Ok(())
}

fn main() -> SessionResult<()> {
    let memory = create_session_store(SessionBackendConfig::InMemory)?;
    run_demo("In-memory", memory.as_ref())?;

    let root = std::env::temp_dir().join(format!("presentationer-demo-{}", std::process::id()));
    let files = create_session_store(SessionBackendConfig::File { root: root.clone() })?;
    run_demo("File", files.as_ref())?;
    println!("File sessions lived under {}", root.display());
    Ok(())
}
