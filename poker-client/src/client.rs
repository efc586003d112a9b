use anyhow::{Context, Result, bail};
use flow_cell::{DEFAULT_CAPACITY, FlowCell};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{
    io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::{debug, info, warn};

use crate::{
    ansi::{self, Colorize, Rgb},
    card::{Card, PokerHand, hand_symbols},
    cli::ClientArgs,
    console::{Console, Screen, animate},
    message::{Envelope, MessageType, read_envelope, write_envelope},
    prompt::{self, Continue, DiscardChoice, HAND_SIZE, PokerPlay},
};

pub async fn run(args: ClientArgs) -> Result<()> {
    let stream = TcpStream::connect((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("failed to connect to {}:{}", args.host, args.port))?;
    info!("connected to {}:{}", args.host, args.port);

    let (reader, writer) = stream.into_split();
    let mut table = Table::new(BufReader::new(reader), writer);
    let mut console = Console::new(BufReader::new(tokio::io::stdin()), Screen::stdout());

    play(&mut table, &mut console, args.name).await?;
    table.shutdown().await;
    Ok(())
}

/// The connection to the game server, speaking in the server's terms.
pub struct Table<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Table<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub async fn send<T: Serialize>(&mut self, kind: MessageType, payload: &T) -> Result<()> {
        let envelope = Envelope::new(kind, payload).context("failed to encode message")?;
        write_envelope(&mut self.writer, &envelope)
            .await
            .with_context(|| format!("failed to send {kind:?}"))?;
        debug!(?kind, "sent message");
        Ok(())
    }

    pub async fn receive(&mut self) -> Result<Envelope> {
        match read_envelope(&mut self.reader).await? {
            Some(envelope) => {
                debug!(kind = ?envelope.kind, "received message");
                Ok(envelope)
            }
            None => bail!("server closed the connection"),
        }
    }

    async fn receive_payload<T: DeserializeOwned>(&mut self, expecting: &str) -> Result<T> {
        let envelope = self.receive().await?;
        envelope
            .payload()
            .with_context(|| format!("expected {expecting}, got {:?} message", envelope.kind))
    }

    /// The server opens with an `UPDATE` carrying the name it picked for us.
    pub async fn receive_suggested_name(&mut self) -> Result<String> {
        let envelope = self.receive().await?;
        if envelope.kind != MessageType::Update {
            warn!(kind = ?envelope.kind, "expected a name update first");
            return Ok(String::new());
        }
        Ok(match envelope.any {
            serde_json::Value::String(name) => name,
            other => other.to_string(),
        })
    }

    pub async fn rename(&mut self, name: &str) -> Result<()> {
        self.send(MessageType::Rename, &name).await
    }

    pub async fn receive_players(&mut self) -> Result<Vec<String>> {
        self.receive_payload("the player list").await
    }

    pub async fn draw_cards(&mut self, amount: usize) -> Result<Vec<Card>> {
        self.send(MessageType::DrawCards, &amount).await?;
        self.receive_payload("drawn cards").await
    }

    pub async fn evaluate(&mut self, hand: &[Card]) -> Result<PokerHand> {
        self.send(MessageType::GetHand, &hand).await?;
        self.receive_payload("a hand evaluation").await
    }

    pub async fn submit(&mut self, hand: &[Card]) -> Result<()> {
        self.send(MessageType::SubmitHand, &hand).await
    }

    /// Waits for the round's `CHAT` announcement; anything else reads as an
    /// empty announcement.
    pub async fn receive_result(&mut self) -> Result<String> {
        let envelope = self.receive().await?;
        if envelope.kind != MessageType::Chat {
            return Ok(String::new());
        }
        envelope
            .payload()
            .context("expected the round announcement text")
    }

    pub async fn shutdown(&mut self) {
        if let Err(error) = self.writer.shutdown().await {
            warn!(?error, "failed to shutdown connection cleanly");
        }
    }
}

/// Joins the table and plays rounds until the player declines another one.
pub async fn play<R, W, I>(
    table: &mut Table<R, W>,
    console: &mut Console<I>,
    name: Option<String>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
{
    join_table(table, console, name).await?;

    for round in 1u32.. {
        play_round(table, console).await?;
        info!(round, "round finished");

        if ask_continue(console).await? == Continue::No {
            break;
        }
    }
    Ok(())
}

async fn join_table<R, W, I>(
    table: &mut Table<R, W>,
    console: &mut Console<I>,
    name: Option<String>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
{
    let suggested = table.receive_suggested_name().await?;
    let name = match name {
        Some(name) => name,
        None => console.prompt(&prompt::name_prompt(&suggested)).await?,
    };
    let name = name.trim();
    if !name.is_empty() {
        table.rename(name).await?;
    }

    let players = table.receive_players().await?;
    let listing: Vec<String> = players
        .iter()
        .map(|player| player.color(Rgb::random()))
        .collect();
    console
        .line(&format!("Players:\n{}", listing.join("\n")))
        .await
}

async fn play_round<R, W, I>(table: &mut Table<R, W>, console: &mut Console<I>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
{
    console.line(&"-".repeat(50).color(Rgb::random())).await?;

    let hand = table.draw_cards(HAND_SIZE).await?;
    let rank = table.evaluate(&hand).await?;
    console.line(&describe_hand(rank, &hand)).await?;

    let kept = choose_discards(console, &hand).await?;
    let discarded = kept.iter().filter(|slot| slot.is_none()).count();
    let replacements = table.draw_cards(discarded).await?;
    let hand: Vec<Card> = kept.into_iter().flatten().chain(replacements).collect();

    let rank = table.evaluate(&hand).await?;
    console.line(&describe_hand(rank, &hand)).await?;

    table.submit(&hand).await?;
    let screen = console.screen().clone();
    let announcement = animate(&screen, "Waiting on other players", table.receive_result()).await?;

    let banner = ansi::frame(&announcement, &format!("You Had: {}", rank.name()));
    console.line(&banner.color(rank.color())).await
}

/// Lets the player blank out cards by position until they stop or nothing
/// is left. The selection lives in a cell whose watcher redraws the hand on
/// every change.
async fn choose_discards<I>(console: &mut Console<I>, hand: &[Card]) -> Result<Vec<Option<Card>>>
where
    I: AsyncBufRead + Unpin,
{
    console.line(&prompt::discard_prompt()).await?;

    let selection = FlowCell::new(hand.iter().copied().map(Some).collect::<Vec<_>>());
    let screen = console.screen().clone();
    let redraw = selection.watch(DEFAULT_CAPACITY, move |slots| {
        let screen = screen.clone();
        async move {
            if let Err(err) = screen.line(&prompt::render_selection(&slots)).await {
                debug!(?err, "failed to redraw hand");
            }
        }
    })?;

    let mut choice = PokerPlay::Continue;
    while choice != PokerPlay::Stop && !selection.with(|slots| slots.iter().all(Option::is_none)) {
        match DiscardChoice::parse(&console.read_line().await?) {
            Some(DiscardChoice::Play(play)) => {
                choice = play;
                selection.touch().await;
            }
            Some(DiscardChoice::Slot(index)) => selection.set_at(index, None).await?,
            None => continue,
        }
    }

    let kept = selection.get();
    drop(selection);
    redraw.finished().await;
    Ok(kept)
}

async fn ask_continue<I>(console: &mut Console<I>) -> Result<Continue>
where
    I: AsyncBufRead + Unpin,
{
    let question = prompt::continue_prompt();
    loop {
        if let Some(answer) = Continue::parse(&console.prompt(&question).await?) {
            return Ok(answer);
        }
    }
}

fn describe_hand(rank: PokerHand, hand: &[Card]) -> String {
    format!("You have: {} with {}", rank.name(), hand_symbols(hand)).color(rank.color())
}
