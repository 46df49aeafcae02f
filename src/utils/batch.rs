use std::future::Future;

/// Run `op` over `items` in fixed-size batches. Members of a batch run
/// concurrently; the next batch starts only after the whole current batch
/// has settled. The first failure aborts the run and no later batch is
/// attempted.
pub async fn run_in_batches<'a, T, F, Fut, E>(
    items: &'a [T],
    batch_size: usize,
    mut op: F,
) -> Result<usize, E>
where
    F: FnMut(&'a T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut done = 0;

    for chunk in items.chunks(batch_size) {
        futures::future::try_join_all(chunk.iter().map(|item| op(item))).await?;

        done += chunk.len();
        tracing::info!("Batch settled: {}/{}", done, items.len());
    }

    Ok(done)
}
