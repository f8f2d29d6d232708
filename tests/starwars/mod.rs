//! Star Wars fixture shared by the integration tests
//!
//! Two fragments over one resolver: `BaseSchema` owns the `Character`
//! interface, the `Episode` enum and `hero`; `SearchSchema` owns the
//! concrete characters, planets, the `SearchResult` union and the lookups.
//! Each references types owned by the other.

#![allow(dead_code)]

use schema_compose::async_graphql::Error as GraphQLError;
use schema_compose::prelude::*;
use tracing_subscriber::EnvFilter;

// ── Domain ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Episode {
    #[serde(rename = "NEWHOPE")]
    NewHope,
    #[serde(rename = "EMPIRE")]
    Empire,
    #[serde(rename = "JEDI")]
    Jedi,
}

schema_compose::impl_enum_type!(Episode, "Episode", {
    NewHope => "NEWHOPE",
    Empire => "EMPIRE",
    Jedi => "JEDI",
});

#[derive(Debug, Clone)]
pub struct Planet {
    pub id: String,
    pub name: String,
    pub diameter: i32,
    pub rotation_period: i32,
    pub orbital_period: i32,
    pub residents: Vec<Human>,
}

#[derive(Debug, Clone)]
pub struct Human {
    pub id: String,
    pub name: String,
    pub friends: Vec<String>,
    pub appears_in: Vec<Episode>,
    pub home_planet: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Droid {
    pub id: String,
    pub name: String,
    pub friends: Vec<String>,
    pub appears_in: Vec<Episode>,
    pub primary_function: String,
}

pub enum Character {
    Human(Human),
    Droid(Droid),
}

pub enum SearchResult {
    Planet(Planet),
    Human(Human),
    Droid(Droid),
}

schema_compose::impl_object_type!(Planet, "Planet");
schema_compose::impl_object_type!(Human, "Human");
schema_compose::impl_object_type!(Droid, "Droid");
schema_compose::impl_abstract_type!(Character, "Character", Interface, [Human, Droid]);
schema_compose::impl_abstract_type!(SearchResult, "SearchResult", Union, [Planet, Human, Droid]);

const ALL_EPISODES: [Episode; 3] = [Episode::NewHope, Episode::Empire, Episode::Jedi];

fn human(id: &str, name: &str, friends: &[&str], home_planet: Option<&str>) -> Human {
    Human {
        id: id.to_string(),
        name: name.to_string(),
        friends: friends.iter().map(|f| f.to_string()).collect(),
        appears_in: ALL_EPISODES.to_vec(),
        home_planet: home_planet.map(str::to_string),
    }
}

fn droid(id: &str, name: &str, friends: &[&str], primary_function: &str) -> Droid {
    Droid {
        id: id.to_string(),
        name: name.to_string(),
        friends: friends.iter().map(|f| f.to_string()).collect(),
        appears_in: ALL_EPISODES.to_vec(),
        primary_function: primary_function.to_string(),
    }
}

pub fn humans() -> Vec<Human> {
    vec![
        human("1000", "Luke Skywalker", &["1002", "1003", "2000", "2001"], Some("Tatooine")),
        human("1001", "Darth Vader", &["1004"], Some("Tatooine")),
        human("1002", "Han Solo", &["1000", "1003", "2001"], None),
        human("1003", "Leia Organa", &["1000", "1002", "2000", "2001"], Some("Alderaan")),
        human("1004", "Wilhuff Tarkin", &["1001"], None),
    ]
}

pub fn droids() -> Vec<Droid> {
    vec![
        droid("2000", "C-3PO", &["1000", "1002", "1003", "2001"], "Protocol"),
        droid("2001", "R2-D2", &["1000", "1002", "1003"], "Astromech"),
    ]
}

pub fn planets() -> Vec<Planet> {
    let residents = |planet: &str| {
        humans()
            .into_iter()
            .filter(|h| h.home_planet.as_deref() == Some(planet))
            .collect()
    };

    vec![
        Planet {
            id: "10001".to_string(),
            name: "Tatooine".to_string(),
            diameter: 10465,
            rotation_period: 23,
            orbital_period: 304,
            residents: residents("Tatooine"),
        },
        Planet {
            id: "10002".to_string(),
            name: "Alderaan".to_string(),
            diameter: 12500,
            rotation_period: 24,
            orbital_period: 364,
            residents: residents("Alderaan"),
        },
    ]
}

pub fn character(id: &str) -> Option<Character> {
    if let Some(human) = humans().into_iter().find(|h| h.id == id) {
        return Some(Character::Human(human));
    }
    droids()
        .into_iter()
        .find(|d| d.id == id)
        .map(Character::Droid)
}

fn friends_of(ids: &[String]) -> Vec<Character> {
    ids.iter().filter_map(|id| character(id)).collect()
}

// ── Resolver & context ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StarWarsResolver;

impl StarWarsResolver {
    pub fn hero(&self, episode: Option<Episode>) -> Character {
        match episode {
            Some(Episode::Empire) => character("1000"),
            _ => character("2001"),
        }
        .expect("fixture characters exist")
    }

    pub fn human(&self, id: &str) -> Option<Human> {
        humans().into_iter().find(|h| h.id == id)
    }

    pub fn droid(&self, id: &str) -> Option<Droid> {
        droids().into_iter().find(|d| d.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.to_lowercase();
        let matches = |name: &str| name.to_lowercase().contains(&query);

        let mut results: Vec<SearchResult> = planets()
            .into_iter()
            .filter(|p| matches(&p.name))
            .map(SearchResult::Planet)
            .collect();
        results.extend(
            humans()
                .into_iter()
                .filter(|h| matches(&h.name))
                .map(SearchResult::Human),
        );
        results.extend(
            droids()
                .into_iter()
                .filter(|d| matches(&d.name))
                .map(SearchResult::Droid),
        );
        results
    }
}

#[derive(Debug, Clone, Default)]
pub struct StarWarsContext;

#[derive(Debug, Deserialize)]
pub struct HeroArguments {
    pub episode: Option<Episode>,
}

#[derive(Debug, Deserialize)]
pub struct IdArguments {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchArguments {
    pub query: String,
}

pub type StarWarsField = Field<StarWarsResolver, StarWarsContext>;
pub type StarWarsFragment = Fragment<StarWarsResolver, StarWarsContext>;

// ── Base fragment ─────────────────────────────────────────────────────

pub fn character_interface() -> TypeDefinition {
    Interface::new("Character")
        .description("A character in the Star Wars Trilogy")
        .field(FieldSignature::new::<String>("id").description("The id of the character."))
        .field(FieldSignature::new::<String>("name").description("The name of the character."))
        .field(
            FieldSignature::new::<Vec<Character>>("friends")
                .description("The friends of the character, or an empty list if they have none."),
        )
        .field(
            FieldSignature::new::<Vec<Episode>>("appearsIn")
                .description("Which movies they appear in."),
        )
        .field(
            FieldSignature::new::<Option<String>>("secretBackstory")
                .description("All secrets about their past."),
        )
        .into()
}

pub fn episode_enum() -> TypeDefinition {
    Enum::new("Episode")
        .description("One of the films in the Star Wars Trilogy.")
        .value(EnumValue::new("NEWHOPE").description("Released in 1977."))
        .value(EnumValue::new("EMPIRE").description("Released in 1980."))
        .value(EnumValue::new("JEDI").description("Released in 1983."))
        .into()
}

pub fn hero_field() -> StarWarsField {
    Field::sync(
        "hero",
        |resolver: &StarWarsResolver, _: &StarWarsContext, args: HeroArguments| {
            resolver.hero(args.episode)
        },
    )
    .argument(Argument::new::<Option<Episode>>("episode").description(
        "If omitted, returns the hero of the whole saga. \
         If provided, returns the hero of that particular episode.",
    ))
    .description("Returns a hero based on the given episode.")
}

pub struct BaseSchema;

impl PartialSchema<StarWarsResolver, StarWarsContext> for BaseSchema {
    fn types(&self) -> Vec<TypeDefinition> {
        vec![character_interface(), episode_enum()]
    }

    fn query(&self) -> Vec<StarWarsField> {
        vec![hero_field()]
    }
}

/// Builder-style twin of [`BaseSchema`]
pub fn base_fragment() -> StarWarsFragment {
    Fragment::builder("BaseSchema")
        .add_type(character_interface())
        .add_type(episode_enum())
        .add_query(hero_field())
        .build()
        .expect("base fragment is well formed")
}

// ── Search fragment ───────────────────────────────────────────────────

pub fn planet_object() -> TypeDefinition {
    Object::<Planet, StarWarsContext>::new("Planet")
        .description("A large mass, planet or planetoid in the Star Wars Universe, at the time of 0 ABY.")
        .field(Field::at("id", |p: &Planet| p.id.clone()))
        .field(Field::at("name", |p: &Planet| p.name.clone()))
        .field(Field::at("diameter", |p: &Planet| p.diameter))
        .field(Field::at("rotationPeriod", |p: &Planet| p.rotation_period))
        .field(Field::at("orbitalPeriod", |p: &Planet| p.orbital_period))
        .field(Field::at("residents", |p: &Planet| p.residents.clone()))
        .into()
}

pub fn human_object() -> TypeDefinition {
    Object::<Human, StarWarsContext>::new("Human")
        .description("A humanoid creature in the Star Wars universe.")
        .implements("Character")
        .field(Field::at("id", |h: &Human| h.id.clone()))
        .field(Field::at("name", |h: &Human| h.name.clone()))
        .field(Field::at("appearsIn", |h: &Human| h.appears_in.clone()))
        .field(Field::at("homePlanet", |h: &Human| h.home_planet.clone()))
        .field(
            Field::future("friends", |h: &Human, _: &StarWarsContext, _: NoArguments| {
                let friends = h.friends.clone();
                async move { friends_of(&friends) }
            })
            .description("The friends of the human, or an empty list if they have none."),
        )
        .field(
            Field::fallible(
                "secretBackstory",
                |_: &Human, _: &StarWarsContext, _: NoArguments| {
                    Err::<Option<String>, _>("secretBackstory is secret.")
                },
            )
            .description("Where are they from and how they came to be who they are."),
        )
        .into()
}

pub fn droid_object() -> TypeDefinition {
    Object::<Droid, StarWarsContext>::new("Droid")
        .description("A mechanical creature in the Star Wars universe.")
        .implements("Character")
        .field(Field::at("id", |d: &Droid| d.id.clone()))
        .field(Field::at("name", |d: &Droid| d.name.clone()))
        .field(Field::at("appearsIn", |d: &Droid| d.appears_in.clone()))
        .field(Field::at("primaryFunction", |d: &Droid| d.primary_function.clone()))
        .field(
            Field::sync("friends", |d: &Droid, _: &StarWarsContext, _: NoArguments| {
                friends_of(&d.friends)
            })
            .description("The friends of the droid, or an empty list if they have none."),
        )
        .field(
            Field::fallible_future(
                "secretBackstory",
                |_: &Droid, _: &StarWarsContext, _: NoArguments| async {
                    Err::<Option<String>, _>("secretBackstory is secret.")
                },
            )
            .description("Where are they from and how they came to be who they are."),
        )
        .into()
}

pub fn search_result_union() -> TypeDefinition {
    Union::new("SearchResult")
        .members(["Planet", "Human", "Droid"])
        .into()
}

pub fn human_query() -> StarWarsField {
    Field::future(
        "human",
        |resolver: &StarWarsResolver, _: &StarWarsContext, args: IdArguments| {
            let found = resolver.human(&args.id);
            async move { found }
        },
    )
    .argument(Argument::new::<String>("id").description("Id of the human."))
}

pub fn droid_query() -> StarWarsField {
    Field::fallible(
        "droid",
        |resolver: &StarWarsResolver, _: &StarWarsContext, args: IdArguments| {
            Ok::<_, GraphQLError>(resolver.droid(&args.id))
        },
    )
    .argument(Argument::new::<String>("id").description("Id of the droid."))
}

pub fn search_query() -> StarWarsField {
    Field::fallible_future(
        "search",
        |resolver: &StarWarsResolver, _: &StarWarsContext, args: SearchArguments| {
            let results = resolver.search(&args.query);
            async move { Ok::<_, GraphQLError>(results) }
        },
    )
    .argument(Argument::new::<String>("query").default_value("R2-D2"))
}

pub struct SearchSchema;

impl PartialSchema<StarWarsResolver, StarWarsContext> for SearchSchema {
    fn types(&self) -> Vec<TypeDefinition> {
        vec![
            planet_object(),
            human_object(),
            droid_object(),
            search_result_union(),
        ]
    }

    fn query(&self) -> Vec<StarWarsField> {
        vec![human_query(), droid_query(), search_query()]
    }
}

/// Builder-style twin of [`SearchSchema`]
pub fn search_fragment() -> StarWarsFragment {
    Fragment::builder("SearchSchema")
        .add_type(planet_object())
        .add_type(human_object())
        .add_type(droid_object())
        .add_type(search_result_union())
        .add_query(human_query())
        .add_query(droid_query())
        .add_query(search_query())
        .build()
        .expect("search fragment is well formed")
}

// ── Helpers ───────────────────────────────────────────────────────────

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn api(schema: Schema<StarWarsResolver, StarWarsContext>) -> GraphQLApi<StarWarsResolver, StarWarsContext> {
    GraphQLApi::new(StarWarsResolver, schema)
}

pub const HUMAN_QUERY: &str = r#"
    query {
        human(id: "1000") {
            name
        }
    }
"#;

pub fn luke() -> serde_json::Value {
    serde_json::json!({ "human": { "name": "Luke Skywalker" } })
}
