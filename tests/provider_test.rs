mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Call, RecordingSinks, settings_for, write_entry_file};
use linedex::protocol::serve_lines;
use linedex::provider::MASKED_SUBTITLE;
use linedex::{Activation, DirectoryIndexer, Dispatcher, Entry, EntryId, SearchProvider};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const LINKS: &str = "\
# work links
GitHub|https://github.com
GitHub token|pass
Standup notes|Agenda
- review
- plan
";

async fn setup(sinks: Arc<RecordingSinks>) -> (TempDir, DirectoryIndexer, SearchProvider) {
    let temp_dir = TempDir::new().unwrap();
    write_entry_file(temp_dir.path(), "links.txt", LINKS);

    let settings = settings_for(temp_dir.path());
    let indexer = DirectoryIndexer::new(&settings).unwrap();
    indexer.scan(&CancellationToken::new()).await.unwrap();

    let dispatcher = Dispatcher::new(sinks, settings.dispatch.clone());
    let provider = SearchProvider::new(indexer.reader(), dispatcher);
    (temp_dir, indexer, provider)
}

#[tokio::test]
async fn test_list_and_describe() {
    let (_temp_dir, _indexer, provider) = setup(Arc::new(RecordingSinks::default())).await;

    let ids = provider.list_matches(&["github"]).await;
    assert_eq!(ids.len(), 2);

    let metas = provider.describe(&ids).await;
    assert_eq!(metas[0].title, "GitHub");
    assert_eq!(metas[0].subtitle, "https://github.com");
    assert_eq!(metas[0].icon, "web-browser");
    assert_eq!(metas[1].title, "GitHub token");
    assert_eq!(metas[1].subtitle, MASKED_SUBTITLE);
}

#[tokio::test]
async fn test_describe_skips_unknown_ids() {
    let (_temp_dir, _indexer, provider) = setup(Arc::new(RecordingSinks::default())).await;

    let mut ids = provider.list_matches(&["standup"]).await;
    ids.insert(0, EntryId::from("/nowhere.txt:7"));

    let metas = provider.describe(&ids).await;
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0].subtitle, "Agenda");
}

#[tokio::test]
async fn test_refine_matches_narrows() {
    let (_temp_dir, _indexer, provider) = setup(Arc::new(RecordingSinks::default())).await;

    let previous = provider.list_matches(&["git"]).await;
    let refined = provider.refine_matches(&previous, &["git", "token"]).await;

    assert_eq!(refined.len(), 1);
    assert_eq!(refined, provider.list_matches(&["git", "token"]).await);
}

#[tokio::test]
async fn test_activate_routes_through_dispatcher() {
    let sinks = Arc::new(RecordingSinks::default());
    let (_temp_dir, _indexer, provider) = setup(sinks.clone()).await;

    let ids = provider.list_matches(&["standup"]).await;
    let outcome = provider.activate(&ids[0], &CancellationToken::new()).await;

    assert!(matches!(outcome, Activation::Copied { .. }));
    assert_eq!(
        sinks.calls(),
        vec![Call::Clipboard("Agenda\n- review\n- plan".to_string())]
    );
}

#[tokio::test]
async fn test_activate_unknown_id_is_a_noop() {
    let sinks = Arc::new(RecordingSinks::default());
    let (_temp_dir, _indexer, provider) = setup(sinks.clone()).await;

    let outcome = provider
        .activate(&EntryId::from("/nowhere.txt:0"), &CancellationToken::new())
        .await;

    assert!(matches!(outcome, Activation::Failed { .. }));
    assert!(sinks.calls().is_empty());
}

#[tokio::test]
async fn test_failing_sinks_leave_store_unchanged() {
    let (_temp_dir, indexer, provider) = setup(Arc::new(RecordingSinks::failing())).await;
    let before: Vec<Entry> = indexer.reader().read().await.iter().cloned().collect();

    for id in provider.list_matches::<&str>(&[]).await {
        let outcome = provider.activate(&id, &CancellationToken::new()).await;
        assert!(matches!(outcome, Activation::Failed { .. }));
    }

    let after: Vec<Entry> = indexer.reader().read().await.iter().cloned().collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_json_lines_session() {
    let sinks = Arc::new(RecordingSinks::default());
    let (_temp_dir, _indexer, provider) = setup(sinks.clone()).await;

    let input = concat!(
        r#"{"method":"list_matches","terms":["GIT"],"limit":1}"#,
        "\n",
        "garbage\n",
        "\n",
        r#"{"method":"refine_matches","ids":[],"terms":["git"]}"#,
        "\n",
    );
    let mut output = Vec::new();
    let answered = serve_lines(&provider, input.as_bytes(), &mut output, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(answered, 3);

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let listed = responses[0]["result"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].as_str().unwrap().ends_with("links.txt:0"));
    assert!(responses[1]["error"].as_str().unwrap().contains("invalid request"));
    assert_eq!(responses[2]["result"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_json_lines_describe_and_activate() {
    let sinks = Arc::new(RecordingSinks::default());
    let (_temp_dir, _indexer, provider) = setup(sinks.clone()).await;
    let id = provider.list_matches(&["GitHub"]).await[0].clone();

    let input = format!(
        "{}\n{}\n",
        serde_json::json!({"method": "describe", "ids": [id]}),
        serde_json::json!({"method": "activate", "id": id}),
    );
    let mut output = Vec::new();
    serve_lines(&provider, input.as_bytes(), &mut output, &CancellationToken::new())
        .await
        .unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses[0]["result"][0]["title"], "GitHub");
    assert_eq!(responses[1]["result"]["outcome"], "opened");
    assert_eq!(responses[1]["result"]["uri"], "https://github.com");
    assert_eq!(sinks.calls(), vec![Call::LaunchUri("https://github.com".to_string())]);
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, request: Value) {
    let line = format!("{request}\n");
    writer.write_all(line.as_bytes()).await.unwrap();
    writer.flush().await.unwrap();
}

async fn next_reply<R: tokio::io::AsyncBufRead + Unpin>(replies: &mut Lines<R>) -> Value {
    let line = timeout(Duration::from_secs(5), replies.next_line())
        .await
        .expect("timed out waiting for a reply")
        .unwrap()
        .expect("session closed");
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn test_slow_activation_does_not_block_and_can_be_cancelled() {
    let sinks = Arc::new(RecordingSinks {
        lookup_output: "hunter2".to_string(),
        lookup_delay: Some(Duration::from_secs(3)),
        ..Default::default()
    });
    let (_temp_dir, _indexer, provider) = setup(sinks.clone()).await;
    let id = provider.list_matches(&["token"]).await[0].clone();

    let (client, server) = tokio::io::duplex(4096);
    let session = tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(server);
        serve_lines(&provider, BufReader::new(reader), writer, &CancellationToken::new()).await
    });
    let (reader, mut writer) = tokio::io::split(client);
    let mut replies = BufReader::new(reader).lines();

    send(&mut writer, json!({"seq": 1, "method": "activate", "id": id})).await;
    send(&mut writer, json!({"seq": 2, "method": "list_matches", "terms": ["git"]})).await;

    // The query is answered while the lookup is still sleeping
    let listed = timeout(Duration::from_secs(1), next_reply(&mut replies))
        .await
        .expect("query blocked behind activation");
    assert_eq!(listed["seq"], 2);
    assert_eq!(listed["result"].as_array().unwrap().len(), 2);

    send(&mut writer, json!({"seq": 3, "method": "cancel", "id": id})).await;
    let mut rest = vec![next_reply(&mut replies).await, next_reply(&mut replies).await];
    rest.sort_by_key(|reply| reply["seq"].as_u64());

    assert_eq!(rest[0]["seq"], 1);
    assert_eq!(rest[0]["result"]["outcome"], "cancelled");
    assert_eq!(rest[1]["seq"], 3);
    assert_eq!(rest[1]["result"]["cancelled"], 1);
    assert_eq!(sinks.clipboard(), None);

    writer.shutdown().await.unwrap();
    let answered = timeout(Duration::from_secs(5), session)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(answered, 3);
}

#[tokio::test]
async fn test_eof_waits_for_pending_activation() {
    let sinks = Arc::new(RecordingSinks {
        lookup_output: "hunter2".to_string(),
        lookup_delay: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let (_temp_dir, _indexer, provider) = setup(sinks.clone()).await;
    let id = provider.list_matches(&["token"]).await[0].clone();

    let input = format!("{}\n", json!({"method": "activate", "id": id}));
    let mut output = Vec::new();
    let answered = serve_lines(&provider, input.as_bytes(), &mut output, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answered, 1);
    let reply: Value = serde_json::from_slice(&output).unwrap();
    assert!(reply.get("seq").is_none());
    assert_eq!(reply["result"]["outcome"], "copied");
    assert_eq!(sinks.clipboard().as_deref(), Some("hunter2"));
}
