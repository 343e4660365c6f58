use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{DexError, DexResult};
use crate::pagination::PageRequest;
use crate::region::IdRange;
use crate::state::{
    parse_identifier, EvolutionNode, ListPage, MoveInfo, MoveRef, RecordDetail, RecordFacts,
    RecordStat, RecordSummary, SpeciesInfo,
};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
const FACTS_CONCURRENCY: usize = 12;

/// Read-only access to the upstream catalog.
///
/// Lookups by key accept an identifier or a lowercase name. Locators are the
/// absolute URLs the catalog hands out in its own responses.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn list_page(&self, request: &PageRequest) -> DexResult<ListPage>;
    async fn fetch_detail(&self, key: &str) -> DexResult<RecordDetail>;
    async fn fetch_species(&self, locator: &str) -> DexResult<SpeciesInfo>;
    async fn fetch_evolution_chain(&self, locator: &str) -> DexResult<EvolutionNode>;
    async fn fetch_move(&self, locator: &str) -> DexResult<MoveInfo>;
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    count: u32,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u16,
    weight: u16,
    base_experience: Option<u16>,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    moves: Vec<PokemonMoveSlot>,
    species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    move_info: NamedResource,
    #[serde(default)]
    version_group_details: Vec<VersionGroupDetail>,
}

#[derive(Clone, Debug, Deserialize)]
struct VersionGroupDetail {
    level_learned_at: u16,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    name: String,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
    color: Option<NamedResource>,
    #[serde(default)]
    egg_groups: Vec<NamedResource>,
    gender_rate: i8,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    #[serde(default)]
    evolution_details: Vec<EvolutionDetailResponse>,
    #[serde(default)]
    evolves_to: Vec<ChainLink>,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionDetailResponse {
    trigger: NamedResource,
    min_level: Option<u16>,
    item: Option<NamedResource>,
    min_happiness: Option<u16>,
}

#[derive(Clone, Debug, Deserialize)]
struct MoveDetailResponse {
    name: String,
    power: Option<u16>,
    accuracy: Option<u16>,
    pp: Option<u16>,
    #[serde(rename = "type")]
    type_info: Option<NamedResource>,
    damage_class: Option<NamedResource>,
}

/// HTTP adapter for PokeAPI with an optional on-disk response cache.
#[derive(Clone, Debug)]
pub struct PokeApiClient {
    base: String,
    cache: Option<PathBuf>,
}

impl PokeApiClient {
    pub fn new(base: impl Into<String>, cache: Option<PathBuf>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            cache,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn record_url(&self, id: u32) -> String {
        format!("{}/pokemon/{id}/", self.base)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> DexResult<T> {
        let bytes = self.fetch_bytes(url).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(url, error = %err, "discarding undecodable response");
                if let Some(root) = &self.cache {
                    let _ = fs::remove_file(cache_path(root, url)).await;
                }
                Err(DexError::TransientFetchError(format!("{url}: {err}")))
            }
        }
    }

    async fn fetch_bytes(&self, url: &str) -> DexResult<Vec<u8>> {
        let cached = match &self.cache {
            Some(root) => read_cache(&cache_path(root, url)).await,
            None => None,
        };
        if let Some(bytes) = cached {
            tracing::trace!(url, "cache hit");
            return Ok(bytes);
        }

        tracing::debug!(url, "GET");
        let response = http_client()
            .get(url)
            .send()
            .await
            .map_err(|err| DexError::TransientFetchError(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, %status, "upstream rejected request");
            return Err(DexError::NotFound(format!("{url} ({status})")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| DexError::TransientFetchError(err.to_string()))?
            .to_vec();
        if let Some(root) = &self.cache {
            write_cache(&cache_path(root, url), &bytes).await;
        }
        Ok(bytes)
    }
}

#[async_trait]
impl RecordSource for PokeApiClient {
    async fn list_page(&self, request: &PageRequest) -> DexResult<ListPage> {
        let url = match request {
            PageRequest::Offset { offset, limit } => {
                format!("{}/pokemon?offset={offset}&limit={limit}", self.base)
            }
            PageRequest::Cursor(url) => url.clone(),
        };
        let response: ListResponse = self.fetch_json(&url).await?;
        Ok(list_page_from(response))
    }

    async fn fetch_detail(&self, key: &str) -> DexResult<RecordDetail> {
        let key = key.trim().to_lowercase();
        let url = format!("{}/pokemon/{}", self.base, urlencoding::encode(&key));
        let response: PokemonResponse = self.fetch_json(&url).await.map_err(|err| match err {
            DexError::NotFound(_) => DexError::NotFound(key.clone()),
            other => other,
        })?;
        let locator = self.record_url(response.id);
        Ok(detail_from(response, locator))
    }

    async fn fetch_species(&self, locator: &str) -> DexResult<SpeciesInfo> {
        let response: PokemonSpeciesResponse = self.fetch_json(locator).await?;
        Ok(species_from(response))
    }

    async fn fetch_evolution_chain(&self, locator: &str) -> DexResult<EvolutionNode> {
        let response: EvolutionChainResponse = self.fetch_json(locator).await?;
        Ok(linear_chain(&response.chain))
    }

    async fn fetch_move(&self, locator: &str) -> DexResult<MoveInfo> {
        let response: MoveDetailResponse = self.fetch_json(locator).await?;
        Ok(move_from(response))
    }
}

/// Fetch every record in `range` one at a time, in ascending order. The
/// first failure aborts the whole load.
pub async fn fetch_range(source: &dyn RecordSource, range: IdRange) -> DexResult<Vec<RecordDetail>> {
    let mut records = Vec::with_capacity(range.len());
    for id in range.ids() {
        let record = source.fetch_detail(&id.to_string()).await?;
        records.push(record);
    }
    tracing::debug!(start = range.start, end = range.end, count = records.len(), "range loaded");
    Ok(records)
}

/// Gather filter facts for `records` with bounded concurrency. Individual
/// failures are skipped; the call fails only when nothing could be loaded.
pub async fn fetch_facts(
    source: Arc<dyn RecordSource>,
    records: &[RecordSummary],
) -> DexResult<Vec<RecordFacts>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(FACTS_CONCURRENCY));
    let mut join_set = JoinSet::new();
    for record in records {
        let key = record.lookup_key();
        let source = source.clone();
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| DexError::TransientFetchError("facts semaphore closed".into()))?;
            source.fetch_detail(&key).await.map(|detail| detail.facts())
        });
    }

    let mut facts = Vec::with_capacity(records.len());
    let mut last_error = None;
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok(entry)) => facts.push(entry),
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "facts lookup failed");
                last_error = Some(err);
            }
            Err(err) => {
                last_error = Some(DexError::TransientFetchError(err.to_string()));
            }
        }
    }

    if facts.is_empty() {
        return Err(last_error
            .unwrap_or_else(|| DexError::TransientFetchError("no facts loaded".into())));
    }
    facts.sort_by_key(|entry| entry.id);
    Ok(facts)
}

/// Fetch two records concurrently. Either failure fails the pair.
pub async fn fetch_pair(
    source: &dyn RecordSource,
    left: &str,
    right: &str,
) -> DexResult<(RecordDetail, RecordDetail)> {
    futures_util::future::try_join(source.fetch_detail(left), source.fetch_detail(right)).await
}

fn list_page_from(response: ListResponse) -> ListPage {
    ListPage {
        records: response
            .results
            .into_iter()
            .map(|entry| RecordSummary::new(entry.name, entry.url))
            .collect(),
        next: response.next,
        previous: response.previous,
        total_count: response.count,
    }
}

fn detail_from(response: PokemonResponse, url: String) -> RecordDetail {
    let types = response
        .types
        .into_iter()
        .map(|slot| slot.type_info.name)
        .collect();
    let stats = response
        .stats
        .into_iter()
        .map(|slot| RecordStat {
            name: slot.stat.name,
            value: slot.base_stat,
        })
        .collect();
    let abilities = response
        .abilities
        .into_iter()
        .map(|slot| slot.ability.name)
        .collect();
    let moves = response
        .moves
        .into_iter()
        .map(|slot| MoveRef {
            level_learned_at: slot
                .version_group_details
                .first()
                .map(|detail| detail.level_learned_at)
                .unwrap_or(0),
            name: slot.move_info.name,
            url: slot.move_info.url,
        })
        .collect();

    RecordDetail {
        id: response.id,
        name: response.name,
        url,
        height: response.height,
        weight: response.weight,
        base_experience: response.base_experience,
        types,
        abilities,
        stats,
        moves,
        species_url: response.species.map(|species| species.url),
    }
}

fn species_from(response: PokemonSpeciesResponse) -> SpeciesInfo {
    let flavor_text = response
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == "en")
        .map(|entry| sanitize_text(&entry.flavor_text));
    let genus = response
        .genera
        .iter()
        .find(|entry| entry.language.name == "en")
        .map(|entry| entry.genus.clone());
    SpeciesInfo {
        name: response.name,
        genus,
        flavor_text,
        color: response.color.map(|color| color.name),
        egg_groups: response
            .egg_groups
            .into_iter()
            .map(|group| group.name)
            .collect(),
        gender_rate: response.gender_rate,
        evolution_chain_url: response.evolution_chain.map(|chain| chain.url),
    }
}

fn move_from(response: MoveDetailResponse) -> MoveInfo {
    MoveInfo {
        name: response.name,
        move_type: response.type_info.map(|info| info.name),
        power: response.power,
        accuracy: response.accuracy,
        pp: response.pp,
        damage_class: response.damage_class.map(|class| class.name),
    }
}

// Branching chains keep only their first branch.
fn linear_chain(link: &ChainLink) -> EvolutionNode {
    EvolutionNode {
        id: parse_identifier(&link.species.url).unwrap_or(0),
        name: link.species.name.clone(),
        trigger: trigger_text(&link.evolution_details),
        next: link
            .evolves_to
            .first()
            .map(|next| Box::new(linear_chain(next))),
    }
}

fn trigger_text(details: &[EvolutionDetailResponse]) -> Option<String> {
    let detail = details.first()?;
    if let Some(level) = detail.min_level {
        return Some(format!("Lv {level}"));
    }
    if let Some(item) = &detail.item {
        return Some(format!("Use {}", item.name.replace('-', " ")));
    }
    if detail.min_happiness.is_some() {
        return Some("High friendship".to_string());
    }
    Some(detail.trigger.name.replace('-', " "))
}

fn sanitize_text(text: &str) -> String {
    text.replace(['\n', '\u{000C}'], " ")
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

fn cache_path(root: &Path, url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    root.join("http").join(digest)
}

async fn read_cache(path: &Path) -> Option<Vec<u8>> {
    fs::read(path).await.ok()
}

async fn write_cache(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }
    let _ = fs::write(path, bytes).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_response_keeps_cursors_and_total() {
        let json = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;
        let page = list_page_from(serde_json::from_str(json).unwrap());
        assert_eq!(page.total_count, 1302);
        assert_eq!(page.records[1].id(), Some(2));
        assert!(page.previous.is_none());
        assert_eq!(
            page.next.as_deref(),
            Some("https://pokeapi.co/api/v2/pokemon?offset=20&limit=20")
        );
    }

    #[test]
    fn pokemon_response_takes_first_learn_level() {
        let json = r#"{
            "id": 25, "name": "pikachu", "height": 4, "weight": 60, "base_experience": 112,
            "types": [{"slot": 1, "type": {"name": "electric", "url": "t/13/"}}],
            "stats": [{"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": "s/1/"}}],
            "abilities": [{"ability": {"name": "static", "url": "a/9/"}, "is_hidden": false}],
            "moves": [
                {"move": {"name": "thunder-shock", "url": "https://pokeapi.co/api/v2/move/84/"},
                 "version_group_details": [{"level_learned_at": 1}, {"level_learned_at": 5}]},
                {"move": {"name": "thunderbolt", "url": "https://pokeapi.co/api/v2/move/85/"},
                 "version_group_details": []}
            ],
            "species": {"name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/"}
        }"#;
        let detail = detail_from(
            serde_json::from_str(json).unwrap(),
            "https://pokeapi.co/api/v2/pokemon/25/".into(),
        );
        assert_eq!(detail.types, vec!["electric"]);
        assert_eq!(detail.stat("hp"), Some(35));
        let levels: Vec<_> = detail.moves.iter().map(|m| m.level_learned_at).collect();
        assert_eq!(levels, vec![1, 0]);
        assert_eq!(detail.summary().id(), Some(25));
        assert_eq!(detail.base_experience, Some(112));
    }

    #[test]
    fn species_response_picks_english_entries() {
        let json = r#"{
            "name": "eevee",
            "flavor_text_entries": [
                {"flavor_text": "Ein Pokemon", "language": {"name": "de", "url": "l/6/"}},
                {"flavor_text": "Its genetic code\nis irregular.", "language": {"name": "en", "url": "l/9/"}}
            ],
            "genera": [{"genus": "Evolution Pokémon", "language": {"name": "en", "url": "l/9/"}}],
            "color": {"name": "brown", "url": "c/3/"},
            "egg_groups": [{"name": "ground", "url": "e/5/"}],
            "gender_rate": 1,
            "evolution_chain": {"url": "https://pokeapi.co/api/v2/evolution-chain/67/"}
        }"#;
        let species = species_from(serde_json::from_str(json).unwrap());
        assert_eq!(
            species.flavor_text.as_deref(),
            Some("Its genetic code is irregular.")
        );
        assert_eq!(species.genus.as_deref(), Some("Evolution Pokémon"));
        assert_eq!(species.color.as_deref(), Some("brown"));
        assert_eq!(species.egg_groups, vec!["ground"]);
        assert_eq!(species.gender_split(), Some((12.5, 87.5)));
    }

    #[test]
    fn evolution_chain_follows_first_branch_with_triggers() {
        let json = r#"{"chain": {
            "species": {"name": "eevee", "url": "https://pokeapi.co/api/v2/pokemon-species/133/"},
            "evolution_details": [],
            "evolves_to": [
                {"species": {"name": "vaporeon", "url": "https://pokeapi.co/api/v2/pokemon-species/134/"},
                 "evolution_details": [{"trigger": {"name": "use-item", "url": "x"},
                    "item": {"name": "water-stone", "url": "i"}, "min_level": null, "min_happiness": null}],
                 "evolves_to": []},
                {"species": {"name": "jolteon", "url": "https://pokeapi.co/api/v2/pokemon-species/135/"},
                 "evolution_details": [], "evolves_to": []}
            ]
        }}"#;
        let response: EvolutionChainResponse = serde_json::from_str(json).unwrap();
        let chain = linear_chain(&response.chain);
        let names: Vec<_> = chain.stages().iter().map(|node| node.name.clone()).collect();
        assert_eq!(names, vec!["eevee", "vaporeon"]);
        assert_eq!(chain.trigger, None);
        assert_eq!(
            chain.next.as_ref().and_then(|node| node.trigger.clone()),
            Some("Use water stone".into())
        );
        assert_eq!(chain.next.as_ref().map(|node| node.id), Some(134));
    }

    #[test]
    fn level_trigger_wins_over_trigger_name() {
        let details = vec![EvolutionDetailResponse {
            trigger: NamedResource {
                name: "level-up".into(),
                url: String::new(),
            },
            min_level: Some(16),
            item: None,
            min_happiness: None,
        }];
        assert_eq!(trigger_text(&details), Some("Lv 16".into()));
        assert_eq!(trigger_text(&[]), None);
    }

    #[test]
    fn move_response_maps_type_and_class() {
        let json = r#"{"name": "ember", "power": 40, "accuracy": 100, "pp": 25,
            "type": {"name": "fire", "url": "t/10/"},
            "damage_class": {"name": "special", "url": "d/3/"}}"#;
        let info = move_from(serde_json::from_str(json).unwrap());
        assert_eq!(info.move_type.as_deref(), Some("fire"));
        assert_eq!(info.power, Some(40));
        assert_eq!(info.damage_class.as_deref(), Some("special"));
    }

    #[test]
    fn cache_paths_are_stable_per_url() {
        let root = Path::new("/tmp/dexview");
        let a = cache_path(root, "https://pokeapi.co/api/v2/pokemon/1");
        let b = cache_path(root, "https://pokeapi.co/api/v2/pokemon/1");
        let c = cache_path(root, "https://pokeapi.co/api/v2/pokemon/2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("/tmp/dexview/http"));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = PokeApiClient::new("http://localhost:8080/api/v2/", None);
        assert_eq!(client.base(), "http://localhost:8080/api/v2");
        assert_eq!(client.record_url(7), "http://localhost:8080/api/v2/pokemon/7/");
    }
}
