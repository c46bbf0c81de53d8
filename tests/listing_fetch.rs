use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use playbar::listing::{fetch_listing, load_tracks};
use playbar::model::{Settings, Track};
use reqwest::blocking::Client;

/// Serves one canned response per accepted connection, then stops.
fn serve(responses: Vec<(u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");

    thread::spawn(move || {
        for (status, body) in responses {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            respond(stream, status, body);
        }
    });

    format!("http://{addr}/songs/")
}

fn respond(mut stream: TcpStream, status: u16, body: &str) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = String::new();
    while reader.read_line(&mut line).map(|read| read > 0).unwrap_or(false) {
        if line == "\r\n" {
            break;
        }
        line.clear();
    }

    let reason = if status == 200 { "OK" } else { "Not Found" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}

fn settings_for(url: String) -> Settings {
    Settings {
        songs_url: url,
        ..Settings::default()
    }
}

#[test]
fn listing_keeps_audio_files_in_server_order() {
    let url = serve(vec![(
        200,
        r#"<html><body><ul>
<li><a href="a.mp3">a.mp3</a></li>
<li><a href="b.txt">b.txt</a></li>
<li><a href="c.mp3">c.mp3</a></li>
</ul></body></html>"#,
    )]);

    let tracks = load_tracks(&Client::new(), &settings_for(url));

    assert_eq!(tracks, vec![Track::from("a.mp3"), Track::from("c.mp3")]);
}

#[test]
fn not_found_yields_empty_list() {
    let url = serve(vec![(404, "missing")]);
    let client = Client::new();

    assert!(fetch_listing(&client, &url).is_err());

    let url = serve(vec![(404, "missing")]);
    assert!(load_tracks(&client, &settings_for(url)).is_empty());
}

#[test]
fn unreachable_server_yields_empty_list() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let tracks = load_tracks(&Client::new(), &settings_for(format!("http://{addr}/songs/")));
    assert!(tracks.is_empty());
}

#[test]
fn fetch_error_message_carries_the_cause() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let url = format!("http://{addr}/songs/");

    let err = fetch_listing(&Client::new(), &url).expect_err("connection should be refused");
    let message = err.to_string();
    let prefix = format!("failed to fetch {url}: ");
    assert!(message.starts_with(&prefix), "unexpected message: {message}");
    assert!(message.len() > prefix.len());
}

#[test]
fn plain_text_listing_has_no_tracks() {
    let url = serve(vec![(200, "a.mp3\nb.mp3\n")]);
    assert!(load_tracks(&Client::new(), &settings_for(url)).is_empty());
}
