use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::error::Error;
use crate::pipeline::{ContentArtifact, Pipeline};
use crate::ForgeFoot;

/// Public API for the allwrite backend - owns the task
///
/// Every call queues a command and awaits its reply, so callers see
/// one call, one result.
pub struct ForgeBackend
{   hand: crate::ForgeHand
  , _task_handle: tokio::task::JoinHandle<()>
}

fn disconnected<T>(_: T) -> Error
{   error!("Backend channel closed");
    Error::BackendDisconnected
}

/// Await the single reply to a queued command
async fn await_reply<T>(
  mut reply_rx: mpsc::UnboundedReceiver<T>
) -> Result<T, Error>
{   reply_rx.recv().await.ok_or_else(|| {
      error!("Backend dropped reply channel");
      Error::BackendDisconnected
    })
}

impl ForgeBackend
{   /// Create and spawn a new backend around `pipeline`
    /// Returns immediately - spawns background task
    pub fn new(pipeline: Pipeline) -> Self
    {   debug!("Creating ForgeBackend with task ownership");

        let (generate_tx, generate_rx)
          = mpsc::unbounded_channel();
        let (refine_tx, refine_rx)
          = mpsc::unbounded_channel();
        let (optimize_tx, optimize_rx)
          = mpsc::unbounded_channel();
        let (check_tx, check_rx)
          = mpsc::unbounded_channel();
        let (run_brief_tx, run_brief_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::ForgeHand
        {   generate_tx
          , refine_tx
          , optimize_tx
          , check_tx
          , run_brief_tx
          , kill_process_tx
        };

        let foot = crate::ForgeFoot
        {   generate_rx
          , refine_rx
          , optimize_rx
          , check_rx
          , run_brief_rx
          , kill_process_rx
        };

        let pipeline = Arc::new(pipeline);
        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, pipeline).await
        });

        ForgeBackend
        {   hand
          , _task_handle
        }
    }

    /// Generate content through the provider chain
    pub async fn generate(
      &self
    , request: crate::request::GenerationRequest
    ) -> Result<crate::request::ProviderResult, Error>
    {   debug!("generate queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.generate_tx
          .send(crate::GenerateArgs
          {   request
            , reply: reply_tx
          })
          .map_err(disconnected)?;

        await_reply(reply_rx).await
    }

    pub async fn refine(
      &self
    , text: String
    , style: String
    , length: String
    , audience: String
    ) -> Result<crate::refiner::Refinement, Error>
    {   debug!("refine queuing command for style: {}", style);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.refine_tx
          .send(crate::RefineArgs
          {   text
            , style
            , length
            , audience
            , reply: reply_tx
          })
          .map_err(disconnected)?;

        await_reply(reply_rx).await
    }

    pub async fn optimize(
      &self
    , text: String
    , keywords: Vec<String>
    , target_url: Option<String>
    ) -> Result<crate::seo::SeoOptimization, Error>
    {   debug!("optimize queuing {} keywords", keywords.len());
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.optimize_tx
          .send(crate::OptimizeArgs
          {   text
            , keywords
            , target_url
            , reply: reply_tx
          })
          .map_err(disconnected)?;

        await_reply(reply_rx).await
    }

    pub async fn check(
      &self
    , text: String
    , check_facts: bool
    ) -> Result<crate::originality::PlagiarismReport, Error>
    {   debug!("check queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.check_tx
          .send(crate::CheckArgs
          {   text
            , check_facts
            , reply: reply_tx
          })
          .map_err(disconnected)?;

        await_reply(reply_rx).await
    }

    /// Run the whole pipeline for one brief
    pub async fn run_brief(
      &self
    , brief: crate::request::ContentBrief
    , target_url: Option<String>
    , check_facts: bool
    ) -> Result<ContentArtifact, Error>
    {   debug!("run_brief queuing '{}'", brief.title);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.run_brief_tx
          .send(crate::RunBriefArgs
          {   brief
            , target_url
            , check_facts
            , reply: reply_tx
          })
          .map_err(disconnected)?;

        await_reply(reply_rx).await
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), Error>
    {   debug!("Shutting down ForgeBackend");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.kill_process_tx
          .send(crate::KillProcessArgs
          {   reply: reply_tx
          })
          .map_err(disconnected)?;

        await_reply(reply_rx).await?
    }
}

/// Main backend event loop
///
/// tokio::select! only routes. Text stages are pure and answer inline;
/// anything that waits on providers runs in its own task so a slow
/// provider never blocks the queue.
async fn run_backend_loop(
  foot: ForgeFoot
, pipeline: Arc<Pipeline>
)
{   debug!("Starting ForgeBackend event loop");
    let ForgeFoot
    {   mut generate_rx
      , mut refine_rx
      , mut optimize_rx
      , mut check_rx
      , mut run_brief_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_rx.recv() => {
          debug!("Received Generate");
          let pipeline = pipeline.clone();
          tokio::spawn(async move {
            let result = pipeline.generate(&cmd.request).await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = refine_rx.recv() => {
          debug!("Received Refine");
          let _ = cmd.reply.send(
            pipeline.refine(&cmd.text, &cmd.style, &cmd.length, &cmd.audience)
          );
        }
      , Some(cmd) = optimize_rx.recv() => {
          debug!("Received Optimize");
          let _ = cmd.reply.send(
            pipeline.optimize(&cmd.text, &cmd.keywords, cmd.target_url.as_deref())
          );
        }
      , Some(cmd) = check_rx.recv() => {
          debug!("Received Check");
          let _ = cmd.reply.send(pipeline.check(&cmd.text, cmd.check_facts));
        }
      , Some(cmd) = run_brief_rx.recv() => {
          debug!("Received RunBrief");
          let pipeline = pipeline.clone();
          tokio::spawn(async move {
            let artifact = pipeline
              .run(&cmd.brief, cmd.target_url.as_deref(), cmd.check_facts)
              .await;
            let _ = cmd.reply.send(artifact);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("ForgeBackend shutting down");
          break;
        }
      , else => {
          info!("All ForgeBackend handles dropped");
          break;
        }
      }
    }
}
