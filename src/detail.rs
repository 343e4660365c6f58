//! Detail aggregation: record, species, evolution chain and move table in
//! one all-or-nothing pipeline.

use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::api::RecordSource;
use crate::error::{DexError, DexResult};
use crate::state::{DetailView, MoveInfo, MoveRef, MoveRow};

const MOVE_CONCURRENCY: usize = 8;

/// Load everything the detail view needs for `key`.
///
/// The primary record is fetched first, then its species, then the chain.
/// Move metadata is fetched concurrently once the record is known. A failure
/// of the primary lookup is returned as is; any later stage failing turns
/// into [`DexError::IncompleteAggregation`] and no partial view is produced.
pub async fn aggregate(source: &dyn RecordSource, key: &str) -> DexResult<DetailView> {
    let record = source.fetch_detail(key).await?;

    let species_url = record.species_url.clone().ok_or_else(|| {
        DexError::incomplete("species", DexError::NotFound(format!("species of {}", record.name)))
    })?;
    let species = source
        .fetch_species(&species_url)
        .await
        .map_err(|err| DexError::incomplete("species", err))?;

    let evolution = match species.evolution_chain_url.as_deref() {
        Some(locator) => Some(
            source
                .fetch_evolution_chain(locator)
                .await
                .map_err(|err| DexError::incomplete("evolution chain", err))?,
        ),
        None => None,
    };

    let locators: Vec<String> = record.moves.iter().map(|m| m.url.clone()).collect();
    let infos: Vec<MoveInfo> = stream::iter(locators)
        .map(|url| async move { source.fetch_move(&url).await })
        .buffered(MOVE_CONCURRENCY)
        .try_collect()
        .await
        .map_err(|err| DexError::incomplete("moves", err))?;
    let moves = move_table(&record.moves, &infos);

    tracing::debug!(key, moves = moves.len(), "detail aggregated");
    Ok(DetailView {
        record,
        species,
        evolution,
        moves,
    })
}

/// Level-up moves only, ascending by level. Moves learned at level 0 come
/// from other methods and are left out; equal levels keep upstream order.
pub fn move_table(refs: &[MoveRef], infos: &[MoveInfo]) -> Vec<MoveRow> {
    let mut rows: Vec<MoveRow> = refs
        .iter()
        .zip(infos)
        .filter(|(move_ref, _)| move_ref.level_learned_at > 0)
        .map(|(move_ref, info)| MoveRow {
            level: move_ref.level_learned_at,
            name: move_ref.name.clone(),
            move_type: info.move_type.clone(),
            power: info.power,
            accuracy: info.accuracy,
            pp: info.pp,
            damage_class: info.damage_class.clone(),
        })
        .collect();
    rows.sort_by_key(|row| row.level);
    rows
}
