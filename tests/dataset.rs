use std::io::{Cursor, Write};

use arbor::dataset::{conll, Load, StdLoader};
use arbor::io::{FromLine, Read};
use arbor::lang::{Phrasal, Sentence, Tokenized};
use arbor::preprocessing::{SentenceEncoder, Vocab};
use tempfile::NamedTempFile;

static TREEBANK: &str = "\
# sent_id = 1
# text = The dog barks
1\tThe\tthe\tDET\tDT\tDefinite=Def|PronType=Art\t2\tdet\t_\t_
2\tdog\tdog\tNOUN\tNN\tNumber=Sing\t3\tnsubj\t_\t_
3\tbarks\tbark\tVERB\tVBZ\t_\t0\troot\t_\t_

# text = It's loud
1-2\tIt's\t_\t_\t_\t_\t_\t_\t_\t_
1\tIt\tit\tPRON\tPRP\t_\t2\tnsubj\t_\t_
2\t's\tbe\tAUX\tVBZ\t_\t0\troot\t_\t_
2.1\tloudness\t_\t_\t_\t_\t_\t_\t_\t_
3\tloud\tloud\tADJ\tJJ\tDegree=Pos\t2\t_\t_\t_
";

#[test]
fn test_token_from_line() {
    let token: conll::Token =
        FromLine::from_line("1\tThe\tthe\tDET\tDT\tDefinite=Def\t2\tdet\t_\tSpaceAfter=No")
            .unwrap();
    assert_eq!(token.id(), 1);
    assert_eq!(token.form(), "The");
    assert_eq!(token.lemma(), Some("the"));
    assert_eq!(token.postag(), Some("DET"));
    assert_eq!(token.xpostag(), Some("DT"));
    assert_eq!(token.feats(), Some("Definite=Def"));
    assert_eq!(token.head(), Some(2));
    assert_eq!(token.deprel(), Some("det"));
    assert_eq!(token.deps(), None);
    assert_eq!(token.misc(), Some("SpaceAfter=No"));
}

#[test]
fn test_token_from_line_absent_fields() {
    let token: conll::Token = FromLine::from_line("3\tbarks\t_\t_\t_\t_\t_\t_\t_\t_").unwrap();
    assert_eq!(token.form(), "barks");
    assert_eq!(token.lemma(), None);
    assert_eq!(token.postag(), None);
    assert_eq!(token.feats(), None);
    assert_eq!(token.head(), None);
    assert_eq!(token.deprel(), None);

    // an unparsable head is treated like `_`
    let token: conll::Token = FromLine::from_line("3\tbarks\t_\t_\t_\t_\t8.1\t_\t_\t_").unwrap();
    assert_eq!(token.head(), None);
}

#[test]
fn test_token_from_line_field_count() {
    let short: Result<conll::Token, _> = FromLine::from_line("1\tThe\t_");
    assert!(short.is_err());
    let long: Result<conll::Token, _> =
        FromLine::from_line("1\tThe\t_\t_\t_\t_\t_\t_\t_\t_\textra");
    assert!(long.is_err());
}

#[test]
fn test_read_sentences() {
    let mut reader = conll::Reader::new(Cursor::new(TREEBANK.as_bytes()));
    let mut sentences: Vec<Sentence<conll::Token>> = Vec::new();
    reader.read(&mut sentences).unwrap();
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].len(), 3);
    assert_eq!(sentences[0][0].form(), "The");
    assert_eq!(sentences[0][2].head(), Some(0));
    // the multiword range and the empty node carry no tree annotation
    assert_eq!(sentences[1].len(), 3);
    assert_eq!(sentences[1][0].form(), "It");
    assert_eq!(sentences[1][2].form(), "loud");
}

#[test]
fn test_read_rejects_malformed_line() {
    let broken = "1\tThe\tthe\n";
    let mut reader = conll::Reader::new(Cursor::new(broken.as_bytes()));
    let mut sentences: Vec<Sentence<conll::Token>> = Vec::new();
    assert!(reader.read(&mut sentences).is_err());
}

#[test]
fn test_loader_fit_and_fix() {
    let mut tmpfile = NamedTempFile::new().unwrap();
    write!(tmpfile.as_file_mut(), "{}", TREEBANK).unwrap();

    let mut loader: StdLoader<Sentence<conll::Token>, SentenceEncoder> =
        StdLoader::new(SentenceEncoder::default());
    let dataset = loader.load(tmpfile.path()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset[0].len(), 3);
    // "the" is the first form interned after the reserved entries
    assert_eq!(dataset[0][0].word, 2);
    assert_eq!(dataset[0][0].head, Some(2));
    let grown = loader.preprocessor().vocab().size();
    assert!(grown > 2);

    // a fixed loader transforms without growing the collections
    loader.fix();
    let again = loader.load(tmpfile.path()).unwrap();
    assert_eq!(again, dataset);
    assert_eq!(loader.preprocessor().vocab().size(), grown);

    let encoder = loader.into_preprocessor();
    assert_eq!(encoder.vocab().get("dog"), dataset[0][1].word);
    assert_eq!(encoder.vocab().get("missing"), Vocab::UNKNOWN);
}
