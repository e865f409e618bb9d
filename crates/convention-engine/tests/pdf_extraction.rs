//! End-to-end extraction from generated convention PDFs

use convention_engine::{
    extract_convention_data, extract_convention_fields, map_to_attestation_fields_at,
    ConventionPatterns, ExtractionError,
};
use pretty_assertions::assert_eq;
use shared_pdf::fixture::PdfFixture;
use shared_types::fields::*;

fn default_patterns() -> ConventionPatterns {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../config/convention_patterns.json"
    );
    ConventionPatterns::load(path).expect("default pattern config")
}

fn convention_pdf() -> Vec<u8> {
    PdfFixture::new()
        .line("CONVENTION DE FORMATION PROFESSIONNELLE")
        .line("Entre : Formation Plus, 12 rue des Lilas, 69000 Lyon")
        .line("Ci-après désigné « Formation Plus »")
        .line("Et : Société Exemple, 3 avenue Foch, 75008 Paris")
        .line("Article 1 – Objet")
        .line("L'organisme organise la formation intitulée : Formation Python")
        .line("Durée de la formation : 35 heures soit 5 jours")
        .line("Dates de formation : 01/01/2024 au 05/01/2024")
        .line("Lieu de la formation : Paris")
        .page_break()
        .line("Article 3 – Participants")
        .line("• Martin Durand, Claire Petit")
        .line("Article 4 – Prix")
        .line("Pour le Prestataire : Jean Dupont")
        .build()
}

#[test]
fn extracts_full_convention() {
    let extraction = extract_convention_data(&convention_pdf(), &default_patterns()).unwrap();

    assert_eq!(extraction.participants, vec!["Martin Durand", "Claire Petit"]);
    let fields = &extraction.fields;
    assert_eq!(fields[PROVIDER_NAME], "Formation Plus");
    assert_eq!(fields[BENEFICIARY_NAME], "Martin Durand");
    assert_eq!(fields[COMPANY_NAME], "Société Exemple");
    assert_eq!(fields[ACTION_TITLE], "Formation Python");
    assert_eq!(fields[DATE_START], "01/01/2024");
    assert_eq!(fields[DATE_END], "05/01/2024");
    assert_eq!(fields[DURATION], "35");
    assert_eq!(fields[SIGNATORY_NAME], "Jean Dupont");
}

#[test]
fn mapped_fields_carry_end_date_as_signature_date() {
    let extraction = extract_convention_data(&convention_pdf(), &default_patterns()).unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    let mapped = map_to_attestation_fields_at(&extraction.fields, today);

    assert_eq!(mapped.signature_date, "05/01/2024");
    assert_eq!(mapped.checkbox_action_training, "X");
    assert_eq!(mapped.beneficiary_name, "Martin Durand");
}

#[test]
fn form_only_document_uses_form_fields() {
    let bytes = PdfFixture::new()
        .field("Organisme de formation", "Acme Formation")
        .field("Nom du stagiaire", "Paul Henri")
        .field("Intitulé", "Gestion de projet")
        .field("Date de début", "02/02/2024")
        .field("Date de fin", "03/02/2024")
        .field("Nombre d'heures", "14")
        .build();

    let fields = extract_convention_fields(&bytes, &default_patterns()).unwrap();
    assert_eq!(fields[PROVIDER_NAME], "Acme Formation");
    assert_eq!(fields[BENEFICIARY_NAME], "Paul Henri");
    assert_eq!(fields[ACTION_TITLE], "Gestion de projet");
    assert_eq!(fields[DATE_START], "02/02/2024");
    assert_eq!(fields[DATE_END], "03/02/2024");
    assert_eq!(fields[DURATION], "14");
}

#[test]
fn blank_document_is_rejected() {
    let bytes = PdfFixture::new().build();
    let err = extract_convention_fields(&bytes, &default_patterns()).unwrap_err();
    assert!(matches!(err, ExtractionError::Empty));
}

#[test]
fn incomplete_document_names_missing_fields() {
    let bytes = PdfFixture::new()
        .line("Lieu de la formation : Paris")
        .line("formation intitulée : Excel")
        .build();
    let err = extract_convention_fields(&bytes, &default_patterns()).unwrap_err();

    match err {
        ExtractionError::MissingRequiredFields(missing) => assert_eq!(
            missing,
            vec![PROVIDER_NAME, BENEFICIARY_NAME, DATE_START, DATE_END, DURATION]
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn not_a_pdf() {
    let err = extract_convention_fields(b"hello", &default_patterns()).unwrap_err();
    assert!(matches!(err, ExtractionError::InvalidPdf(_)));
}
