//! Recover command
//!
//! Drives a full batch-recovery session: initiate once, then poll
//! process-batch with the offset stepping by the batch size, sleeping the
//! server-suggested wait time between rounds. The whole session is held
//! client-side; re-running the command after an interruption simply
//! starts a fresh session over the same range.

use clap::Args;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::api::{ApiClient, BatchOutcome, ProcessBatchRequest};
use crate::error::Result;

#[derive(Debug, Args)]
pub struct RecoverArgs {
    /// Start of the order date range (YYYY-MM-DD, inclusive)
    #[arg(long = "from")]
    pub date_from: String,

    /// End of the order date range (YYYY-MM-DD, inclusive)
    #[arg(long = "to")]
    pub date_to: String,

    /// Copy remote attributes for unlinked orders instead of re-saving
    /// every order
    #[arg(long)]
    pub reconcile: bool,

    /// Don't sleep between rounds (for small ranges and tests)
    #[arg(long)]
    pub no_wait: bool,
}

pub async fn run(client: &ApiClient, args: RecoverArgs) -> Result<()> {
    let session = client
        .initiate_recovery(&args.date_from, &args.date_to)
        .await?;

    println!(
        "recovering {} orders from {} to {} (batches of {}, {}s between rounds)",
        session.order_count, session.date_from, session.date_to, session.batch_size,
        session.wait_time
    );

    if session.order_count == 0 {
        println!("nothing to do");
        return Ok(());
    }

    let mut offset = 0i64;
    let mut processed_count = 0usize;

    loop {
        let request = ProcessBatchRequest {
            date_from: args.date_from.clone(),
            date_to: args.date_to.clone(),
            batch_size: session.batch_size,
            offset,
            reconcile: args.reconcile,
        };

        match client.process_batch(&request).await? {
            BatchOutcome::Processed(processed) => {
                processed_count += processed;
                offset += session.batch_size;
                println!("orders processed: {}/{}", processed_count, session.order_count);
            }
            BatchOutcome::Exhausted => {
                debug!("server reported no more orders");
                break;
            }
        }

        if processed_count as i64 >= session.order_count {
            break;
        }
        if !args.no_wait {
            sleep(Duration::from_secs(session.wait_time)).await;
        }
    }

    println!(
        "all orders have been processed: {}/{}",
        processed_count, session.order_count
    );
    Ok(())
}
