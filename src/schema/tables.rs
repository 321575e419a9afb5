//! Table schema definitions for the movies database

use super::types::*;

// =============================================================================
// Lookup Tables (no FK dependencies)
// =============================================================================

pub static GENDER: TableSchema = TableSchema {
    name: "gender",
    source_file: "gender.csv",
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("gender", ColumnType::Varchar(10)),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    na_policy: NaPolicy::Default,
};

pub static COLLECTION: TableSchema = TableSchema {
    name: "collection",
    source_file: "collections.csv",
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("name", ColumnType::Varchar(100)),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    na_policy: NaPolicy::Default,
};

pub static GENRE: TableSchema = TableSchema {
    name: "genre",
    source_file: "genres.csv",
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("name", ColumnType::Varchar(100)),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    na_policy: NaPolicy::Default,
};

pub static SPOKEN_LANGUAGE: TableSchema = TableSchema {
    name: "spoken_language",
    source_file: "spoken_languages.csv",
    columns: &[
        Column::new("id", ColumnType::Char(2)),
        Column::new("language", ColumnType::Varchar(50)),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    na_policy: NaPolicy::Keep,
};

pub static PRODUCTION_COMPANY: TableSchema = TableSchema {
    name: "production_company",
    source_file: "production_companies.csv",
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("company_name", ColumnType::Varchar(100)),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    na_policy: NaPolicy::Keep,
};

pub static PRODUCTION_COUNTRY: TableSchema = TableSchema {
    name: "production_country",
    source_file: "production_countries.csv",
    columns: &[
        Column::new("id", ColumnType::Char(2)),
        Column::new("country_name", ColumnType::Varchar(50)),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    na_policy: NaPolicy::Keep,
};

// =============================================================================
// Core Entities
// =============================================================================

pub static MOVIE: TableSchema = TableSchema {
    name: "movie",
    source_file: "movies.csv",
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("adult", ColumnType::Boolean),
        Column::new("belongs_to_collection", ColumnType::Integer),
        Column::new("budget", ColumnType::BigInt),
        Column::new("imdb_id", ColumnType::Char(9)),
        Column::new("original_language", ColumnType::Char(2)),
        Column::new("original_title", ColumnType::Varchar(200)),
        Column::new("overview", ColumnType::Varchar(1000)),
        Column::new("popularity", ColumnType::Double),
        Column::new("release_date", ColumnType::Date),
        Column::new("revenue", ColumnType::BigInt),
        Column::new("rt_all_critics_num_fresh", ColumnType::Integer),
        Column::new("rt_all_critics_num_reviews", ColumnType::Integer),
        Column::new("rt_all_critics_num_rotten", ColumnType::Integer),
        Column::new("rt_all_critics_rating", ColumnType::Double),
        Column::new("rt_all_critics_score", ColumnType::Integer),
        Column::new("rt_audience_num_ratings", ColumnType::Integer),
        Column::new("rt_audience_rating", ColumnType::Double),
        Column::new("rt_audience_score", ColumnType::Integer),
        Column::new("rt_id", ColumnType::Varchar(100)),
        Column::new("rt_top_critics_rating", ColumnType::Double),
        Column::new("rt_top_critics_num_fresh", ColumnType::Integer),
        Column::new("rt_top_critics_num_reviews", ColumnType::Integer),
        Column::new("rt_top_critics_num_rotten", ColumnType::Integer),
        Column::new("rt_top_critics_score", ColumnType::Integer),
        Column::new("runtime", ColumnType::Integer),
        Column::new("spanish_title", ColumnType::Varchar(200)),
        Column::new("status", ColumnType::Varchar(50)),
        Column::new("tagline", ColumnType::Varchar(500)),
        Column::new("title", ColumnType::Varchar(200)),
        Column::new("tmdb_id", ColumnType::Integer),
        Column::new("video", ColumnType::Boolean),
        Column::new("vote_average", ColumnType::Double),
        Column::new("vote_count", ColumnType::Integer),
        Column::new("year", ColumnType::Integer),
    ],
    primary_key: &["id"],
    foreign_keys: &[ForeignKey::new(
        "movie_collection_fk",
        "belongs_to_collection",
        "collection",
    )],
    na_policy: NaPolicy::Default,
};

pub static PERSON: TableSchema = TableSchema {
    name: "person",
    source_file: "people.csv",
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("adult", ColumnType::Boolean),
        Column::new("biography", ColumnType::Varchar(5000)),
        Column::new("birthday", ColumnType::Date).lenient(),
        Column::new("deathday", ColumnType::Date).lenient(),
        Column::new("gender", ColumnType::Integer),
        Column::new("homepage", ColumnType::Varchar(200)),
        Column::new("imdb_id", ColumnType::Char(10)),
        Column::new("name", ColumnType::Varchar(200)),
        Column::new("place_of_birth", ColumnType::Varchar(200)),
        Column::new("popularity", ColumnType::Double),
    ],
    primary_key: &["id"],
    foreign_keys: &[ForeignKey::new("person_gender_fk", "gender", "gender")],
    na_policy: NaPolicy::Default,
};

// =============================================================================
// Fact and Junction Tables
// =============================================================================

pub static ALSO_KNOWN_AS: TableSchema = TableSchema {
    name: "also_known_as",
    source_file: "also_known_as.csv",
    columns: &[
        Column::new("person_id", ColumnType::Integer),
        Column::new("name", ColumnType::Varchar(200)),
    ],
    primary_key: &["person_id", "name"],
    foreign_keys: &[ForeignKey::new(
        "also_known_as_person_fk",
        "person_id",
        "person",
    )],
    na_policy: NaPolicy::Default,
};

pub static CAST_MEMBER: TableSchema = TableSchema {
    name: "cast_member",
    source_file: "cast_members.csv",
    columns: &[
        Column::new("credit_id", ColumnType::Char(24)),
        Column::new("movie_id", ColumnType::Integer),
        Column::new("person_id", ColumnType::Integer),
        Column::new("cast_id", ColumnType::Integer),
        Column::new("character", ColumnType::Varchar(500)),
        Column::new("gender", ColumnType::Integer),
        Column::new("cast_order", ColumnType::Integer),
    ],
    primary_key: &["credit_id"],
    foreign_keys: &[
        ForeignKey::new("cast_member_movie_fk", "movie_id", "movie"),
        ForeignKey::new("cast_member_person_fk", "person_id", "person"),
        ForeignKey::new("cast_member_gender_fk", "gender", "gender"),
    ],
    na_policy: NaPolicy::Default,
};

pub static CREW: TableSchema = TableSchema {
    name: "crew",
    source_file: "crew.csv",
    columns: &[
        Column::new("credit_id", ColumnType::Char(24)),
        Column::new("movie_id", ColumnType::Integer),
        Column::new("person_id", ColumnType::Integer),
        Column::new("department", ColumnType::Varchar(100)),
        Column::new("job", ColumnType::Varchar(100)),
        Column::new("gender", ColumnType::Integer),
    ],
    primary_key: &["credit_id"],
    foreign_keys: &[
        ForeignKey::new("crew_movie_fk", "movie_id", "movie"),
        ForeignKey::new("crew_person_fk", "person_id", "person"),
        ForeignKey::new("crew_gender_fk", "gender", "gender"),
    ],
    na_policy: NaPolicy::Default,
};

pub static MOVIE_GENRE: TableSchema = TableSchema {
    name: "movie_genre",
    source_file: "movie_genres.csv",
    columns: &[
        Column::new("movie_id", ColumnType::Integer),
        Column::new("genre_id", ColumnType::Integer),
    ],
    primary_key: &["movie_id", "genre_id"],
    foreign_keys: &[
        ForeignKey::new("movie_genre_movie_fk", "movie_id", "movie"),
        ForeignKey::new("movie_genre_genre_fk", "genre_id", "genre"),
    ],
    na_policy: NaPolicy::Default,
};

pub static MOVIE_LANGUAGE: TableSchema = TableSchema {
    name: "movie_language",
    source_file: "movie_languages.csv",
    columns: &[
        Column::new("movie_id", ColumnType::Integer),
        Column::new("language_id", ColumnType::Char(2)),
    ],
    primary_key: &["movie_id", "language_id"],
    foreign_keys: &[
        ForeignKey::new("movie_language_movie_fk", "movie_id", "movie"),
        ForeignKey::new(
            "movie_language_spoken_language_fk",
            "language_id",
            "spoken_language",
        ),
    ],
    na_policy: NaPolicy::Default,
};

pub static MOVIE_PRODUCTION_COMPANY: TableSchema = TableSchema {
    name: "movie_production_company",
    source_file: "movie_production_companies.csv",
    columns: &[
        Column::new("movie_id", ColumnType::Integer),
        Column::new("production_company_id", ColumnType::Integer),
    ],
    primary_key: &["movie_id", "production_company_id"],
    foreign_keys: &[
        ForeignKey::new("movie_production_company_movie_fk", "movie_id", "movie"),
        ForeignKey::new(
            "movie_production_company_production_company_fk",
            "production_company_id",
            "production_company",
        ),
    ],
    na_policy: NaPolicy::Default,
};

pub static MOVIE_PRODUCTION_COUNTRY: TableSchema = TableSchema {
    name: "movie_production_country",
    source_file: "movie_production_countries.csv",
    columns: &[
        Column::new("movie_id", ColumnType::Integer),
        Column::new("production_country_id", ColumnType::Char(2)),
    ],
    primary_key: &["movie_id", "production_country_id"],
    foreign_keys: &[
        ForeignKey::new("movie_production_country_movie_fk", "movie_id", "movie"),
        ForeignKey::new(
            "movie_production_country_production_country_fk",
            "production_country_id",
            "production_country",
        ),
    ],
    na_policy: NaPolicy::Keep,
};

// =============================================================================
// Schema Registry
// =============================================================================

/// All table schemas in load order
pub static ALL_TABLES: &[&TableSchema] = &[
    // Lookups
    &GENDER,
    &COLLECTION,
    &GENRE,
    &SPOKEN_LANGUAGE,
    &PRODUCTION_COMPANY,
    &PRODUCTION_COUNTRY,
    // Core entities
    &MOVIE,
    &PERSON,
    // Facts and junctions
    &ALSO_KNOWN_AS,
    &CAST_MEMBER,
    &CREW,
    &MOVIE_GENRE,
    &MOVIE_LANGUAGE,
    &MOVIE_PRODUCTION_COMPANY,
    &MOVIE_PRODUCTION_COUNTRY,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_unique() {
        let names: HashSet<_> = table_names().into_iter().collect();
        assert_eq!(names.len(), ALL_TABLES.len());
        assert_eq!(ALL_TABLES.len(), 15);
    }

    #[test]
    fn test_primary_key_columns_exist() {
        for table in ALL_TABLES {
            assert!(!table.primary_key.is_empty(), "{} has no key", table.name);
            for col in table.primary_key {
                assert!(
                    table.column(col).is_some(),
                    "{}: key column {} not declared",
                    table.name,
                    col
                );
            }
        }
    }

    #[test]
    fn test_foreign_keys_point_at_single_column_keys() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                assert!(table.column(fk.column).is_some());
                let parent = get_table(fk.references_table).expect("unknown parent");
                assert_eq!(parent.primary_key.len(), 1, "{} -> {}", fk.name, parent.name);
                let parent_type = parent.column(parent.primary_key[0]).unwrap().col_type;
                assert_eq!(table.column(fk.column).unwrap().col_type, parent_type);
            }
        }
    }

    #[test]
    fn test_na_sensitive_tables() {
        let keep: Vec<_> = ALL_TABLES
            .iter()
            .filter(|t| t.na_policy == NaPolicy::Keep)
            .map(|t| t.name)
            .collect();
        assert_eq!(
            keep,
            vec![
                "spoken_language",
                "production_company",
                "production_country",
                "movie_production_country"
            ]
        );
    }

    #[test]
    fn test_only_person_dates_are_lenient() {
        for table in ALL_TABLES {
            for col in table.date_columns() {
                let lenient = col.out_of_range == OutOfRange::Null;
                assert_eq!(lenient, table.name == "person", "{}.{}", table.name, col.name);
            }
        }
        assert_eq!(MOVIE.date_columns().count(), 1);
        assert_eq!(PERSON.date_columns().count(), 2);
    }
}
