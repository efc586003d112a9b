use std::{process::Stdio, time::Duration};

use anyhow::{Context, Result, anyhow};
use poker_client::{
    card::{Card, PokerHand, Suit},
    message::{Envelope, MessageType, read_envelope, write_envelope},
};
use serde::Serialize;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpListener,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    process::Command,
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn binary_plays_one_round_end_to_end() -> Result<()> {
    let binary = assert_cmd::cargo::cargo_bin!("poker-client");

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        send(&mut writer, MessageType::Update, &"Player 1").await?;
        let rename = recv(&mut reader).await?;
        assert_eq!(rename.kind, MessageType::Rename);
        send(&mut writer, MessageType::Update, &vec!["erin"]).await?;

        let hand: Vec<Card> = (2..=6).map(|value| Card::new(value, Suit::Hearts)).collect();
        assert_eq!(recv(&mut reader).await?.kind, MessageType::DrawCards);
        send(&mut writer, MessageType::DrawCards, &hand).await?;
        assert_eq!(recv(&mut reader).await?.kind, MessageType::GetHand);
        send(&mut writer, MessageType::GetHand, &PokerHand::StraightFlush).await?;

        // The player stands pat, so the redraw asks for nothing.
        let redraw = recv(&mut reader).await?;
        assert_eq!(redraw.payload::<usize>()?, 0);
        send(&mut writer, MessageType::DrawCards, &Vec::<Card>::new()).await?;
        assert_eq!(recv(&mut reader).await?.kind, MessageType::GetHand);
        send(&mut writer, MessageType::GetHand, &PokerHand::StraightFlush).await?;

        let submitted = recv(&mut reader).await?;
        assert_eq!(submitted.payload::<Vec<Card>>()?, hand);
        send(&mut writer, MessageType::Chat, &"erin takes the pot").await?;
        Ok::<_, anyhow::Error>(())
    });

    let mut child = Command::new(binary)
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg(port.to_string())
        .arg("--name")
        .arg("erin")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to spawn client")?;

    let mut stdin = child.stdin.take().context("client stdin missing")?;
    stdin.write_all(b"stop\nno\n").await?;
    stdin.flush().await?;

    let mut stdout = child.stdout.take().context("client stdout missing")?;
    let mut shown = String::new();
    timeout(WAIT, stdout.read_to_string(&mut shown)).await??;

    let status = timeout(WAIT, child.wait()).await??;
    if !status.success() {
        return Err(anyhow!("client exited with status {status}: {shown}"));
    }
    timeout(WAIT, server).await???;

    assert!(shown.contains("erin"));
    assert!(shown.contains("You have: Straight Flush with [2♥, 3♥, 4♥, 5♥, 6♥]"));
    assert!(shown.contains("erin takes the pot"));
    Ok(())
}

async fn recv(reader: &mut BufReader<OwnedReadHalf>) -> Result<Envelope> {
    read_envelope(reader).await?.context("client hung up early")
}

async fn send<T: Serialize>(writer: &mut OwnedWriteHalf, kind: MessageType, payload: &T) -> Result<()> {
    write_envelope(writer, &Envelope::new(kind, payload)?).await?;
    Ok(())
}
